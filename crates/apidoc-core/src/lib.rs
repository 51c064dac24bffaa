pub mod config;
pub mod discover;
pub mod error;
pub mod generate;
pub mod index;
pub mod model;
pub mod parse;
pub mod readme;
pub mod resolve;
pub mod service;
pub mod store;

pub use config::ApidocConfig;
pub use error::{IndexError, MergeError, ResolveError, ServiceError};
pub use model::{Field, HttpMethod, OperationDescription, ProjectIndex};
pub use resolve::{OperationResolver, ProjectSession};
pub use service::{ResolveResponse, Workspace};
pub use store::{ContentStore, FileHandle, FileRegistry, FsStore, MemoryStore};

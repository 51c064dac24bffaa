//! Operation resolution: from an endpoint and method to a fully expanded
//! [`OperationDescription`](crate::model::OperationDescription).

pub mod context;
pub mod operation;
pub mod refs;
pub mod session;
pub mod tree;

pub use context::{Loaded, Resolution};
pub use operation::OperationResolver;
pub use refs::{ResolvedRef, candidate_path, resolve_ref, schema_name};
pub use session::ProjectSession;
pub use tree::{Branch, SchemaTree, build_tree};

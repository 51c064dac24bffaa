//! Structural readers over OpenAPI documents.
//!
//! Path files are read line-by-line rather than deserialized: documents are
//! often hand-split fragments that are not valid standalone YAML, and the
//! readers only need a handful of keys from each.

pub mod body;
pub mod metadata;
pub mod method;
pub mod parameter;
pub mod paths;
pub mod scan;

pub use body::{ResponseDecl, parse_responses, request_schema_ref};
pub use metadata::{Metadata, parse_metadata};
pub use method::{detect_methods, extract_method};
pub use parameter::{ParameterDecl, parse_parameter, parse_parameters};
pub use paths::resolve_paths;
pub use scan::{Block, Document};

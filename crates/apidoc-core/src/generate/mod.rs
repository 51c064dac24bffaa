//! Generated documentation parts: example payloads and the defaults every
//! description starts from before hand-written material is merged in.

pub mod defaults;
pub mod example;

pub use defaults::{apply_defaults, default_algorithm, error_responses};
pub use example::{example_json, synthesize};

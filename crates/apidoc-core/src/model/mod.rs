pub mod field;
pub mod operation;
pub mod project;

pub use field::{Field, count_fields, for_each_field_mut};
pub use operation::*;
pub use project::*;

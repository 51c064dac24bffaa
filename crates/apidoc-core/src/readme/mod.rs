//! Companion documents: hand-edited markdown kept next to an endpoint file.
//! Regenerating a description folds their content back in, so edits survive.

pub mod merge;
pub mod parse;

pub use merge::merge_existing;
pub use parse::{ExistingDocument, parse_existing};

use crate::model::{Endpoint, EndpointLayout, HttpMethod, OperationDescription};
use crate::resolve::refs::{basename, join_path, parent_dir};

/// Candidate companion paths for one operation, most specific first.
pub fn companion_paths(endpoint: &Endpoint, method: HttpMethod, suffix: &str) -> Vec<String> {
    match &endpoint.layout {
        EndpointLayout::Flat { file, .. } => {
            let dir = parent_dir(file);
            let name = basename(file);
            let stem = name
                .strip_suffix(".yaml")
                .or_else(|| name.strip_suffix(".yml"))
                .unwrap_or(name);
            vec![
                join_path(dir, &format!("{stem}_{}{suffix}", method.key())),
                join_path(dir, &format!("{stem}{suffix}")),
            ]
        }
        EndpointLayout::Split { files } => files
            .get(&method)
            .map(|file| vec![join_path(parent_dir(file), &format!("{}{suffix}", method.key()))])
            .unwrap_or_default(),
    }
}

/// Parse `content` and merge it into `desc`. A malformed document is logged
/// and ignored.
pub fn overlay(content: &str, path: &str, desc: &mut OperationDescription) {
    match parse_existing(content) {
        Ok(existing) => merge_existing(&existing, desc),
        Err(e) => log::warn!("ignoring companion document {path}: {e}"),
    }
}

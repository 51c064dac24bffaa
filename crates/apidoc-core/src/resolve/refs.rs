//! `$ref` path arithmetic over registry paths.

use crate::store::{FileHandle, FileRegistry};

/// A reference located in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef<'a> {
    pub path: String,
    pub handle: &'a FileHandle,
    /// Located by file name after the computed path missed.
    pub by_basename: bool,
}

/// Join two `/`-separated paths, either of which may be empty.
pub fn join_path(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base.trim_end_matches('/'), rest),
    }
}

/// Directory part of a registry path (`""` at the top level).
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Last path segment.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// File name of a reference without `.yaml`/`.yml` and without fragment.
pub fn schema_name(reference: &str) -> String {
    let file = basename(strip_fragment(reference));
    file.strip_suffix(".yaml")
        .or_else(|| file.strip_suffix(".yml"))
        .unwrap_or(file)
        .to_string()
}

fn strip_fragment(reference: &str) -> &str {
    reference.split('#').next().unwrap_or(reference)
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Registry path a reference points at, computed from the file containing it.
/// `..` never climbs above `root`; `/x` is taken relative to `root`.
pub fn candidate_path(reference: &str, containing_file: &str, root: &str) -> String {
    let reference = strip_fragment(reference);
    let (base, rest) = match reference.strip_prefix('/') {
        Some(rest) => (root, rest),
        None => (parent_dir(containing_file), reference),
    };

    let floor = segments(root).len();
    let mut parts = segments(base);
    for seg in rest.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if parts.len() > floor {
                    parts.pop();
                }
            }
            s => parts.push(s),
        }
    }

    let joined = parts.join("/");
    if base.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Locate `reference` in the registry: the computed path first, then the last
/// entry with the same file name. Fragment-only references never resolve.
pub fn resolve_ref<'a>(
    reference: &str,
    containing_file: &str,
    root: &str,
    registry: &'a FileRegistry,
) -> Option<ResolvedRef<'a>> {
    let target = strip_fragment(reference).trim();
    if target.is_empty() {
        return None;
    }

    let path = candidate_path(target, containing_file, root);
    if let Some(handle) = registry.get(&path) {
        return Some(ResolvedRef {
            path,
            handle,
            by_basename: false,
        });
    }

    let (path, handle) = registry.find_by_basename(basename(target))?;
    log::debug!("{reference} from {containing_file}: {path} matched by file name");
    Some(ResolvedRef {
        path: path.to_string(),
        handle,
        by_basename: true,
    })
}

//! Building a [`ProjectIndex`] from a project's file registry.

use indexmap::IndexMap;

use crate::error::IndexError;
use crate::model::{Endpoint, EndpointLayout, HttpMethod, ProjectIndex};
use crate::parse::{detect_methods, resolve_paths};
use crate::resolve::refs::{basename, candidate_path, join_path, parent_dir};
use crate::store::{ContentStore, FileRegistry};

/// File names recognised as a project's root document.
pub const ROOT_DOCUMENTS: [&str; 2] = ["openapi.yaml", "openapi.yml"];

/// Registry path of the root document directly under `root`.
pub fn find_root_document(root: &str, registry: &FileRegistry) -> Option<String> {
    ROOT_DOCUMENTS
        .iter()
        .map(|name| join_path(root, name))
        .find(|path| registry.contains(path))
}

fn strip_yaml(name: &str) -> Option<&str> {
    name.strip_suffix(".yaml")
        .or_else(|| name.strip_suffix(".yml"))
}

/// Endpoint name for a flat file: its stem, or the root-relative path with
/// `/` turned into `_` when the stem is already taken.
fn endpoint_name(endpoints: &IndexMap<String, Endpoint>, file: &str, root: &str) -> String {
    let base = basename(file);
    let stem = strip_yaml(base).unwrap_or(base);
    if !endpoints.contains_key(stem) {
        return stem.to_string();
    }
    let relative = file
        .strip_prefix(root)
        .unwrap_or(file)
        .trim_start_matches('/');
    strip_yaml(relative).unwrap_or(relative).replace('/', "_")
}

/// Folders under `<root>/paths/` holding `<method>.yaml` files, keyed by
/// folder name.
fn split_folders(
    root: &str,
    registry: &FileRegistry,
) -> IndexMap<String, (String, IndexMap<HttpMethod, String>)> {
    let prefix = format!("{}/", join_path(root, "paths"));
    let mut folders: IndexMap<String, (String, IndexMap<HttpMethod, String>)> = IndexMap::new();

    for path in registry.paths() {
        let Some(relative) = path.strip_prefix(&prefix) else {
            continue;
        };
        let Some((folder, file)) = relative.rsplit_once('/') else {
            continue;
        };
        let Some(method) = strip_yaml(file).and_then(|stem| stem.parse::<HttpMethod>().ok()) else {
            continue;
        };
        folders
            .entry(basename(folder).to_string())
            .or_insert_with(|| (format!("paths/{folder}"), IndexMap::new()))
            .1
            .insert(method, path.to_string());
    }

    for (_, files) in folders.values_mut() {
        files.sort_keys();
    }
    folders
}

/// Index every endpoint of the project rooted at `root`.
///
/// Paths listed in the root document become flat endpoints named after their
/// file; folders of per-method files under `paths/` that the root document
/// does not reach become split endpoints.
pub async fn index_project(
    root: &str,
    root_document: &str,
    registry: FileRegistry,
    store: &dyn ContentStore,
) -> Result<ProjectIndex, IndexError> {
    let handle = registry
        .get(root_document)
        .ok_or_else(|| IndexError::MissingRootDocument(root_document.to_string()))?;
    let text = store
        .read(handle)
        .await
        .map_err(|source| IndexError::Read {
            path: root_document.to_string(),
            source,
        })?;

    let mut endpoints = IndexMap::new();
    for (api_path, reference) in resolve_paths(&text) {
        if reference.starts_with('#') {
            log::debug!("{api_path}: skipping local reference {reference}");
            continue;
        }
        let file = candidate_path(&reference, root_document, root);
        let methods = match registry.get(&file) {
            Some(handle) => match store.read(handle).await {
                Ok(content) => detect_methods(&content),
                Err(e) => {
                    log::warn!("{api_path}: cannot read {file}: {e}");
                    Vec::new()
                }
            },
            None => {
                log::warn!("{api_path}: {reference} is not part of the project");
                Vec::new()
            }
        };
        let name = endpoint_name(&endpoints, &file, root);
        endpoints.insert(
            name.clone(),
            Endpoint {
                name,
                api_path: Some(api_path),
                file_ref: reference,
                layout: EndpointLayout::Flat { file, methods },
            },
        );
    }

    let flat_dirs: Vec<String> = endpoints
        .values()
        .filter_map(|e| match &e.layout {
            EndpointLayout::Flat { file, .. } => Some(parent_dir(file).to_string()),
            EndpointLayout::Split { .. } => None,
        })
        .collect();
    for (name, (folder, files)) in split_folders(root, &registry) {
        if endpoints.contains_key(&name) {
            continue;
        }
        // Per-method files reached through a flat path item are not endpoints of their own.
        if flat_dirs.iter().any(|dir| *dir == join_path(root, &folder)) {
            continue;
        }
        endpoints.insert(
            name.clone(),
            Endpoint {
                name,
                api_path: None,
                file_ref: folder,
                layout: EndpointLayout::Split { files },
            },
        );
    }

    log::info!(
        "indexed {} endpoints from {} files under {}",
        endpoints.len(),
        registry.len(),
        if root.is_empty() { "." } else { root }
    );
    Ok(ProjectIndex {
        root: root.to_string(),
        root_document: root_document.to_string(),
        registry,
        endpoints,
    })
}

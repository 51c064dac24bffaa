//! Finding projects on disk and listing their files.

use std::io;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::IndexError;
use crate::index::ROOT_DOCUMENTS;
use crate::model::ProjectSummary;
use crate::resolve::refs::{join_path, parent_dir};
use crate::store::{FileHandle, FileRegistry};

const REDOCLY_FILES: [&str; 2] = ["redocly.yaml", "redocly.yml"];

#[derive(Debug, Default, Deserialize)]
struct RedoclyConfig {
    #[serde(default)]
    apis: IndexMap<String, RedoclyApi>,
}

#[derive(Debug, Deserialize)]
struct RedoclyApi {
    root: String,
}

/// `/`-joined form of a relative path.
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn read_error(path: &Path) -> impl FnOnce(io::Error) -> IndexError + '_ {
    move |source| IndexError::Read {
        path: path.display().to_string(),
        source,
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

/// Every regular file below `dir`, skipping dot-entries, in path order.
async fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}

async fn root_document_in(base: &Path, root_path: &str) -> Option<String> {
    for name in ROOT_DOCUMENTS {
        let relative = join_path(root_path, name);
        if is_file(&base.join(&relative)).await {
            return Some(relative);
        }
    }
    None
}

async fn redocly_projects(base: &Path) -> Result<Vec<(String, String)>, IndexError> {
    for name in REDOCLY_FILES {
        let path = base.join(name);
        if !is_file(&path).await {
            continue;
        }
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(read_error(&path))?;
        let config: RedoclyConfig =
            serde_yaml_ng::from_str(&text).map_err(|source| IndexError::Yaml {
                path: path.display().to_string(),
                source,
            })?;
        let mut projects = Vec::new();
        for (api, entry) in config.apis {
            let root_document = slash_path(Path::new(&entry.root));
            if is_file(&base.join(&root_document)).await {
                projects.push((api, root_document));
            } else {
                log::warn!("{name}: root document {} of {api} does not exist", entry.root);
            }
        }
        return Ok(projects);
    }
    Ok(Vec::new())
}

/// Projects under `base`: those declared in a redocly config, a root document
/// at `base` itself, and directories one level down holding a root document.
pub async fn discover_projects(base: &Path) -> Result<Vec<ProjectSummary>, IndexError> {
    let mut found: Vec<(String, String)> = redocly_projects(base).await?;

    if let Some(root_document) = root_document_in(base, "").await {
        let name = tokio::fs::canonicalize(base)
            .await
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "api".to_string());
        found.push((name, root_document));
    }

    let mut entries = tokio::fs::read_dir(base).await.map_err(read_error(base))?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_error(base))? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
            dirs.push(name);
        }
    }
    dirs.sort();
    for dir in dirs {
        if let Some(root_document) = root_document_in(base, &dir).await {
            found.push((dir, root_document));
        }
    }

    let mut projects: Vec<ProjectSummary> = Vec::new();
    for (name, root_document) in found {
        let root_path = parent_dir(&root_document).to_string();
        if projects.iter().any(|p| p.root_path == root_path) {
            continue;
        }
        let dir = base.join(&root_path);
        let file_count = list_files(&dir).await.map_err(read_error(&dir))?.len();
        projects.push(ProjectSummary {
            name,
            root_path,
            root_document,
            file_count,
        });
    }
    log::info!("discovered {} projects under {}", projects.len(), base.display());
    Ok(projects)
}

/// Registry of every file in the project at `root_path` (relative to
/// `base`), keyed by `<root_path>/<relative path>` with filesystem paths as
/// handles.
pub async fn build_registry(base: &Path, root_path: &str) -> Result<FileRegistry, IndexError> {
    let dir = base.join(root_path);
    let files = list_files(&dir).await.map_err(read_error(&dir))?;
    let registry: FileRegistry = files
        .iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(&dir).ok()?;
            let key = join_path(root_path, &slash_path(relative));
            Some((key, FileHandle::new(file.to_string_lossy().as_ref())))
        })
        .collect();
    log::debug!("registered {} files under {}", registry.len(), dir.display());
    Ok(registry)
}

//! Content access for resolutions.
//!
//! A [`FileRegistry`] maps registry paths (`<project root>/<relative path>`,
//! always `/`-separated) to opaque [`FileHandle`]s. It is built once when a
//! project is indexed and never changes afterwards. Reading a handle goes
//! through a [`ContentStore`], so the same registry shape works for files on
//! disk and for documents held in memory.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

/// Opaque key a [`ContentStore`] understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle(Arc<str>);

impl FileHandle {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

/// Asynchronous source of document text.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn read(&self, handle: &FileHandle) -> io::Result<String>;
}

/// Reads handles as filesystem paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

#[async_trait]
impl ContentStore for FsStore {
    async fn read(&self, handle: &FileHandle) -> io::Result<String> {
        tokio::fs::read_to_string(handle.key()).await
    }
}

/// Documents held in memory, keyed by registry path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Arc<str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files<K, V>(files: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut store = Self::new();
        for (path, content) in files {
            store.insert(path, content.as_ref());
        }
        store
    }

    pub fn insert(&mut self, path: impl Into<String>, content: &str) -> FileHandle {
        let path = path.into();
        let handle = FileHandle::new(path.as_str());
        self.files.insert(path, Arc::from(content));
        handle
    }

    /// A registry listing every stored document under its own path, in path
    /// order.
    pub fn registry(&self) -> FileRegistry {
        let mut paths: Vec<&String> = self.files.keys().collect();
        paths.sort();
        paths
            .into_iter()
            .map(|p| (p.clone(), FileHandle::new(p.as_str())))
            .collect()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn read(&self, handle: &FileHandle) -> io::Result<String> {
        self.files
            .get(handle.key())
            .map(|content| content.to_string())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no document stored at {}", handle.key()),
                )
            })
    }
}

/// Immutable `registry path -> handle` map for one project.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    entries: IndexMap<String, FileHandle>,
}

impl FileRegistry {
    pub fn new(entries: impl IntoIterator<Item = (String, FileHandle)>) -> Self {
        entries.into_iter().collect()
    }

    pub fn get(&self, path: &str) -> Option<&FileHandle> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The last entry whose path ends with `/<basename>`.
    pub fn find_by_basename(&self, basename: &str) -> Option<(&str, &FileHandle)> {
        let suffix = format!("/{basename}");
        self.entries
            .iter()
            .rev()
            .find(|(path, _)| path.ends_with(&suffix))
            .map(|(path, handle)| (path.as_str(), handle))
    }
}

impl FromIterator<(String, FileHandle)> for FileRegistry {
    fn from_iter<I: IntoIterator<Item = (String, FileHandle)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_basename_last_match_wins() {
        let registry = FileRegistry::new([
            ("p/a/User.yaml".to_string(), FileHandle::new("1")),
            ("p/b/User.yaml".to_string(), FileHandle::new("2")),
            ("p/b/SuperUser.yaml".to_string(), FileHandle::new("3")),
        ]);
        let (path, handle) = registry.find_by_basename("User.yaml").unwrap();
        assert_eq!(path, "p/b/User.yaml");
        assert_eq!(handle.key(), "2");
        assert!(registry.find_by_basename("Missing.yaml").is_none());
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::from_files([("p/openapi.yaml", "openapi: 3.0.0\n")]);
        let registry = store.registry();
        assert_eq!(registry.len(), 1);
        let handle = registry.get("p/openapi.yaml").unwrap();
        assert_eq!(store.read(handle).await.unwrap(), "openapi: 3.0.0\n");

        let err = store.read(&FileHandle::new("p/nope.yaml")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_fs_store_reads_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.yaml");
        std::fs::write(&path, "a: 1\n").unwrap();
        let handle = FileHandle::new(path.to_string_lossy().as_ref());
        assert_eq!(FsStore.read(&handle).await.unwrap(), "a: 1\n");
    }
}

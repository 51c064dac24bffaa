use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexSet;

use super::refs::{ResolvedRef, resolve_ref};
use crate::config::Limits;
use crate::error::ResolveError;
use crate::model::{Field, ProjectIndex, for_each_field_mut};
use crate::store::{ContentStore, FileHandle};

/// A document read on behalf of a `$ref`.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub path: String,
    pub content: String,
}

/// A finished subtree, kept for reuse at any depth.
#[derive(Debug, Clone)]
struct Expanded {
    depth: usize,
    /// Deepest field below `depth`, plus one for refs that produced no fields.
    height: usize,
    fields: Vec<Field>,
}

/// State shared by every branch of one resolution: the file and expansion
/// budgets, finished subtrees, and the references that could not be located.
pub struct Resolution<'a> {
    pub index: &'a ProjectIndex,
    pub store: &'a dyn ContentStore,
    pub limits: Limits,
    touched: Mutex<IndexSet<String>>,
    unresolved: Mutex<Vec<String>>,
    expanded: Mutex<HashMap<String, Expanded>>,
    expansions: AtomicUsize,
    cuts: AtomicUsize,
    fallbacks: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<'a> Resolution<'a> {
    pub fn new(index: &'a ProjectIndex, store: &'a dyn ContentStore, limits: Limits) -> Self {
        Self {
            index,
            store,
            limits,
            touched: Mutex::new(IndexSet::new()),
            unresolved: Mutex::new(Vec::new()),
            expanded: Mutex::new(HashMap::new()),
            expansions: AtomicUsize::new(0),
            cuts: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
        }
    }

    fn touch(&self, path: &str) -> Result<(), ResolveError> {
        let mut touched = lock(&self.touched);
        touched.insert(path.to_string());
        if touched.len() > self.limits.max_files {
            return Err(ResolveError::FileLimitExceeded {
                limit: self.limits.max_files,
            });
        }
        Ok(())
    }

    /// Read a registry file, counting it against the file budget.
    pub async fn read(&self, path: &str, handle: &FileHandle) -> Result<String, ResolveError> {
        self.touch(path)?;
        self.store
            .read(handle)
            .await
            .map_err(|source| ResolveError::Read {
                path: path.to_string(),
                source,
            })
    }

    /// Find `reference` in the registry. A miss is recorded and yields `None`.
    pub fn locate(&self, reference: &str, containing_file: &str) -> Option<ResolvedRef<'a>> {
        let Some(target) = resolve_ref(
            reference,
            containing_file,
            &self.index.root,
            &self.index.registry,
        ) else {
            log::warn!("unresolved $ref {reference} in {containing_file}");
            self.note_unresolved(reference);
            return None;
        };
        if target.by_basename {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        Some(target)
    }

    /// Read a located target. An unreadable file is recorded like a miss;
    /// only budget overruns are errors.
    pub async fn load(
        &self,
        target: ResolvedRef<'_>,
        reference: &str,
    ) -> Result<Option<Loaded>, ResolveError> {
        match self.read(&target.path, target.handle).await {
            Ok(content) => Ok(Some(Loaded {
                path: target.path,
                content,
            })),
            Err(ResolveError::Read { path, source }) => {
                log::warn!("cannot read {path} for $ref {reference}: {source}");
                self.note_unresolved(reference);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// [`locate`](Self::locate) then [`load`](Self::load).
    pub async fn load_ref(
        &self,
        reference: &str,
        containing_file: &str,
    ) -> Result<Option<Loaded>, ResolveError> {
        match self.locate(reference, containing_file) {
            Some(target) => self.load(target, reference).await,
            None => Ok(None),
        }
    }

    /// Count one schema expansion against the budget.
    pub fn begin_expansion(&self) -> Result<(), ResolveError> {
        let done = self.expansions.fetch_add(1, Ordering::Relaxed) + 1;
        if done > self.limits.max_expansions {
            return Err(ResolveError::ExpansionLimitExceeded {
                limit: self.limits.max_expansions,
            });
        }
        Ok(())
    }

    /// Record a reference cut short because its schema was already in flight.
    pub fn note_cut(&self) {
        self.cuts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cuts(&self) -> usize {
        self.cuts.load(Ordering::Relaxed)
    }

    /// Keep the fields `path` expanded to at `depth`. Only subtrees that
    /// contain no cuts may be kept; they read the same from every branch.
    pub fn remember(&self, path: &str, depth: usize, fields: &[Field]) {
        let mut deepest = depth;
        let mut copy = fields.to_vec();
        for_each_field_mut(&mut copy, &mut |f| deepest = deepest.max(f.depth));
        lock(&self.expanded).insert(
            path.to_string(),
            Expanded {
                depth,
                height: deepest - depth + 1,
                fields: copy,
            },
        );
    }

    /// Fields kept for `path`, re-based to `depth`. `None` when nothing is
    /// kept or reuse could hide a depth limit overrun.
    pub fn recall(&self, path: &str, depth: usize) -> Option<Vec<Field>> {
        let expanded = lock(&self.expanded);
        let kept = expanded.get(path)?;
        if depth + kept.height > self.limits.max_depth {
            return None;
        }
        let mut fields = kept.fields.clone();
        for_each_field_mut(&mut fields, &mut |f| f.depth = f.depth - kept.depth + depth);
        Some(fields)
    }

    pub fn note_unresolved(&self, reference: &str) {
        let mut unresolved = lock(&self.unresolved);
        if !unresolved.iter().any(|r| r == reference) {
            unresolved.push(reference.to_string());
        }
    }

    pub fn unresolved(&self) -> Vec<String> {
        lock(&self.unresolved).clone()
    }

    pub fn files_touched(&self) -> usize {
        lock(&self.touched).len()
    }

    pub fn expansions(&self) -> usize {
        self.expansions.load(Ordering::Relaxed)
    }

    /// References located by file name rather than by their path.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }
}

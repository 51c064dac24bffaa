//! The boundary callers talk to: list projects and endpoints, resolve one
//! operation. Errors on the resolve path come back as data rather than `Err`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::ApidocConfig;
use crate::discover::{build_registry, discover_projects};
use crate::error::{IndexError, ServiceError};
use crate::index::index_project;
use crate::model::{EndpointSummary, HttpMethod, OperationDescription, ProjectSummary};
use crate::resolve::ProjectSession;
use crate::store::FsStore;

fn normalize_key(key: &str) -> &str {
    let wanted = key.trim_start_matches("./").trim_matches('/');
    if wanted == "." { "" } else { wanted }
}

/// Result of a resolve request: a description, or `{ "error": message }`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResolveResponse {
    Operation(Box<OperationDescription>),
    Error { error: String },
}

impl ResolveResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ResolveResponse::Error { .. })
    }
}

/// Projects below a base directory on disk. Each project is indexed the
/// first time it is opened; later calls share that session.
pub struct Workspace {
    base: PathBuf,
    config: ApidocConfig,
    store: Arc<FsStore>,
    sessions: Mutex<IndexMap<String, (ProjectSummary, Arc<ProjectSession>)>>,
}

impl Workspace {
    pub fn new(base: impl Into<PathBuf>, config: ApidocConfig) -> Self {
        Self {
            base: base.into(),
            config,
            store: Arc::new(FsStore),
            sessions: Mutex::new(IndexMap::new()),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, IndexError> {
        discover_projects(&self.base).await
    }

    /// Find a project by root path or name; `.` names a project at the base.
    async fn project(&self, key: &str) -> Result<ProjectSummary, ServiceError> {
        let wanted = normalize_key(key);
        self.list_projects()
            .await?
            .into_iter()
            .find(|p| p.root_path == wanted || p.name == key)
            .ok_or_else(|| ServiceError::UnknownProject(key.to_string()))
    }

    /// The session for a project, indexing it on first use.
    pub async fn open(&self, project: &str) -> Result<Arc<ProjectSession>, ServiceError> {
        let mut sessions = self.sessions.lock().await;
        let wanted = normalize_key(project);
        if let Some((_, session)) = sessions
            .values()
            .find(|(summary, _)| summary.root_path == wanted || summary.name == project)
        {
            return Ok(session.clone());
        }

        let summary = self.project(project).await?;
        let registry = build_registry(&self.base, &summary.root_path).await?;
        let index = index_project(
            &summary.root_path,
            &summary.root_document,
            registry,
            self.store.as_ref(),
        )
        .await?;
        let session = Arc::new(ProjectSession::new(
            index,
            self.store.clone(),
            self.config.clone(),
        ));
        log::debug!("opened project {} at {}", summary.name, summary.root_path);
        sessions.insert(summary.root_path.clone(), (summary, session.clone()));
        Ok(session)
    }

    /// Drop every cached session so the next call re-indexes from disk.
    pub async fn reload(&self) {
        self.sessions.lock().await.clear();
    }

    pub async fn list_endpoints(&self, project: &str) -> Result<Vec<EndpointSummary>, ServiceError> {
        let session = self.open(project).await?;
        Ok(session
            .index()
            .endpoints
            .values()
            .map(EndpointSummary::from)
            .collect())
    }

    async fn try_resolve(
        &self,
        project: &str,
        endpoint: &str,
        method: Option<&str>,
    ) -> Result<OperationDescription, ServiceError> {
        let method = match method {
            Some(m) => Some(
                m.parse::<HttpMethod>()
                    .map_err(|_| ServiceError::InvalidMethod(m.to_string()))?,
            ),
            None => None,
        };
        let session = self.open(project).await?;
        Ok(session.resolve(endpoint, method).await?)
    }

    /// Resolve one operation. Without a method the endpoint's first is used.
    pub async fn resolve_operation(
        &self,
        project: &str,
        endpoint: &str,
        method: Option<&str>,
    ) -> ResolveResponse {
        match self.try_resolve(project, endpoint, method).await {
            Ok(desc) => ResolveResponse::Operation(Box::new(desc)),
            Err(e) => {
                log::warn!("resolve {endpoint} in {project} failed: {e}");
                ResolveResponse::Error {
                    error: e.to_string(),
                }
            }
        }
    }
}

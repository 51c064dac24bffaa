use std::sync::Arc;

use tokio::sync::Mutex;

use super::operation::OperationResolver;
use crate::config::ApidocConfig;
use crate::error::ResolveError;
use crate::model::{HttpMethod, OperationDescription, ProjectIndex};
use crate::store::ContentStore;

/// An indexed project that resolutions run against, one at a time.
///
/// Concurrent callers queue on an async mutex; every call finishes and
/// returns its own result, and no partial state is shared between calls.
pub struct ProjectSession {
    index: Arc<ProjectIndex>,
    store: Arc<dyn ContentStore>,
    config: ApidocConfig,
    gate: Mutex<()>,
}

impl ProjectSession {
    pub fn new(index: ProjectIndex, store: Arc<dyn ContentStore>, config: ApidocConfig) -> Self {
        Self {
            index: Arc::new(index),
            store,
            config,
            gate: Mutex::new(()),
        }
    }

    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    pub fn config(&self) -> &ApidocConfig {
        &self.config
    }

    pub async fn resolve(
        &self,
        endpoint: &str,
        method: Option<HttpMethod>,
    ) -> Result<OperationDescription, ResolveError> {
        let _turn = self.gate.lock().await;
        OperationResolver::new(&self.index, self.store.as_ref(), &self.config)
            .resolve(endpoint, method)
            .await
    }
}

//! Shared project list cache

use std::sync::Arc;

use assessor_domain::{AssessorError, ListTab, ProjectSummary, Result};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::listing::ports::ListBackend;

/// Active projects shared across views (e.g. navigation sidebar)
pub struct ProjectCache {
    backend: Arc<dyn ListBackend<ProjectSummary>>,
    projects: RwLock<Vec<ProjectSummary>>,
    last_error: RwLock<Option<AssessorError>>,
}

impl ProjectCache {
    pub fn new(backend: Arc<dyn ListBackend<ProjectSummary>>) -> Self {
        Self { backend, projects: RwLock::new(Vec::new()), last_error: RwLock::new(None) }
    }

    /// Refetch active projects. On failure the previous list is kept.
    ///
    /// # Errors
    /// Propagates the backend error after recording it.
    pub async fn fetch_projects(&self) -> Result<usize> {
        match self.backend.fetch(ListTab::Active, "").await {
            Ok(projects) => {
                let count = projects.len();
                *self.projects.write() = projects;
                *self.last_error.write() = None;
                info!(count, "project cache refreshed");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "project cache refresh failed");
                *self.last_error.write() = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn projects(&self) -> Vec<ProjectSummary> {
        self.projects.read().clone()
    }

    pub fn find(&self, id: &str) -> Option<ProjectSummary> {
        self.projects.read().iter().find(|project| project.id == id).cloned()
    }

    pub fn last_error(&self) -> Option<AssessorError> {
        self.last_error.read().clone()
    }
}

//! Port interface for list data and archive actions

use assessor_domain::{ListRow, ListTab, Result};
use async_trait::async_trait;

/// Server side of a dashboard list
#[async_trait]
pub trait ListBackend<R: ListRow>: Send + Sync {
    /// Fetch one collection filtered by `search` (empty = no filter)
    async fn fetch(&self, tab: ListTab, search: &str) -> Result<Vec<R>>;

    /// Archive a single row
    async fn archive(&self, id: &str) -> Result<()>;

    /// Restore a single archived row
    async fn unarchive(&self, id: &str) -> Result<()>;
}

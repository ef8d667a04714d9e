//! In-memory list backend

use assessor_core::ListBackend;
use assessor_domain::{AssessorError, ListRow, ListTab, Result as DomainResult};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Holds both collections and moves rows between them on archive actions.
///
/// Search matches ids case-insensitively, which is enough for flow tests.
pub struct MockListBackend<R: ListRow> {
    active: Mutex<Vec<R>>,
    archived: Mutex<Vec<R>>,
    fetches: Mutex<Vec<(ListTab, String)>>,
    unavailable: Mutex<bool>,
}

impl<R: ListRow> MockListBackend<R> {
    pub fn new(active: Vec<R>, archived: Vec<R>) -> Self {
        Self {
            active: Mutex::new(active),
            archived: Mutex::new(archived),
            fetches: Mutex::new(Vec::new()),
            unavailable: Mutex::new(false),
        }
    }

    /// Make every subsequent call fail with a server error.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock() = unavailable;
    }

    pub fn fetches(&self) -> Vec<(ListTab, String)> {
        self.fetches.lock().clone()
    }

    fn check(&self) -> DomainResult<()> {
        if *self.unavailable.lock() {
            return Err(AssessorError::Server("Service unavailable".into()));
        }
        Ok(())
    }

    fn transfer(from: &Mutex<Vec<R>>, to: &Mutex<Vec<R>>, id: &str) -> DomainResult<()> {
        let mut source = from.lock();
        let position = source
            .iter()
            .position(|row| row.id() == id)
            .ok_or_else(|| AssessorError::NotFound(format!("row {id}")))?;
        let row = source.remove(position);
        to.lock().push(row);
        Ok(())
    }
}

#[async_trait]
impl<R: ListRow> ListBackend<R> for MockListBackend<R> {
    async fn fetch(&self, tab: ListTab, search: &str) -> DomainResult<Vec<R>> {
        self.check()?;
        self.fetches.lock().push((tab, search.to_string()));
        let rows = match tab {
            ListTab::Active => self.active.lock().clone(),
            ListTab::Archived => self.archived.lock().clone(),
        };
        let needle = search.to_lowercase();
        Ok(rows.into_iter().filter(|row| row.id().to_lowercase().contains(&needle)).collect())
    }

    async fn archive(&self, id: &str) -> DomainResult<()> {
        self.check()?;
        Self::transfer(&self.active, &self.archived, id)
    }

    async fn unarchive(&self, id: &str) -> DomainResult<()> {
        self.check()?;
        Self::transfer(&self.archived, &self.active, id)
    }
}

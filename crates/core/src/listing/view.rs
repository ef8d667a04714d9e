//! List view state: two collections, search, sort, selection, archive actions

use std::collections::BTreeSet;
use std::sync::Arc;

use assessor_domain::{AssessorError, ListRow, ListTab, Result, SortKey};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::ports::ListBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Which rows an archive action targets; never both at once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveTarget {
    Single(String),
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOp {
    Archive,
    Unarchive,
}

impl ArchiveOp {
    /// Collection the targeted rows live in
    pub fn source_tab(self) -> ListTab {
        match self {
            Self::Archive => ListTab::Active,
            Self::Unarchive => ListTab::Archived,
        }
    }
}

/// State of one dashboard list
pub struct ListView<R: ListRow> {
    backend: Arc<dyn ListBackend<R>>,
    tab: ListTab,
    active: Vec<R>,
    archived: Vec<R>,
    search: String,
    sort: Option<(SortKey, SortDirection)>,
    selected: BTreeSet<String>,
    last_error: Option<AssessorError>,
}

impl<R: ListRow> ListView<R> {
    pub fn new(backend: Arc<dyn ListBackend<R>>) -> Self {
        Self {
            backend,
            tab: ListTab::Active,
            active: Vec::new(),
            archived: Vec::new(),
            search: String::new(),
            sort: None,
            selected: BTreeSet::new(),
            last_error: None,
        }
    }

    pub fn tab(&self) -> ListTab {
        self.tab
    }

    /// Switch collections; the selection belongs to the previous tab.
    pub fn set_tab(&mut self, tab: ListTab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected.clear();
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Record the term; the caller schedules the debounced [`refresh`](Self::refresh).
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Fetch one collection with the current search term.
    ///
    /// # Errors
    /// On failure the local collection is left unchanged.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self, tab: ListTab) -> Result<usize> {
        let rows = self.backend.fetch(tab, self.search.trim()).await?;
        self.last_error = None;
        let count = rows.len();
        match tab {
            ListTab::Active => self.active = rows,
            ListTab::Archived => self.archived = rows,
        }
        if tab == self.tab {
            let visible: BTreeSet<String> = self.rows(tab).iter().map(|r| r.id().to_string()).collect();
            self.selected.retain(|id| visible.contains(id));
        }
        Ok(count)
    }

    /// Refetch failure left behind by the last archive action, cleared by
    /// the next successful fetch.
    pub fn last_error(&self) -> Option<&AssessorError> {
        self.last_error.as_ref()
    }

    pub fn rows(&self, tab: ListTab) -> &[R] {
        match tab {
            ListTab::Active => &self.active,
            ListTab::Archived => &self.archived,
        }
    }

    pub fn sort(&self) -> Option<(SortKey, SortDirection)> {
        self.sort
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort = Some((key, direction));
    }

    /// Same key flips the direction, a new key starts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) -> SortDirection {
        let direction = match self.sort {
            Some((current, direction)) if current == key => direction.flipped(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some((key, direction));
        direction
    }

    /// Rows of the current tab in display order (stable sort).
    pub fn visible(&self) -> Vec<&R> {
        let mut rows: Vec<&R> = self.rows(self.tab).iter().collect();
        if let Some((key, direction)) = self.sort {
            rows.sort_by(|a, b| {
                let ordering = a.sort_value(key).compare(&b.sort_value(key));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        rows
    }

    /// Toggle one row; non-archivable rows cannot be selected.
    pub fn toggle_select(&mut self, id: &str) -> bool {
        let archivable = self.rows(self.tab).iter().any(|row| row.id() == id && row.archivable());
        if !archivable {
            return false;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
            return true;
        }
        false
    }

    /// Select exactly the visible archivable rows, or clear when they are
    /// all selected already.
    pub fn toggle_select_all(&mut self) {
        let eligible: BTreeSet<String> = self
            .rows(self.tab)
            .iter()
            .filter(|row| row.archivable())
            .map(|row| row.id().to_string())
            .collect();

        if !eligible.is_empty() && eligible == self.selected {
            self.selected.clear();
        } else {
            self.selected = eligible;
        }
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Archive or unarchive rows one request at a time, then refetch the
    /// collection and clear the selection.
    ///
    /// Returns the number of rows the server accepted. A failed refetch does
    /// not fail the action: the accepted rows are dropped locally and the
    /// fetch error is kept in [`last_error`](Self::last_error).
    ///
    /// # Errors
    /// The first failing request aborts the batch. Rows accepted before it
    /// leave the collection and the selection; the rest stay so the user can
    /// retry them.
    #[instrument(skip(self))]
    pub async fn apply_archive_action(&mut self, target: ArchiveTarget, op: ArchiveOp) -> Result<usize> {
        let ids: Vec<String> = match target {
            ArchiveTarget::Single(id) => vec![id],
            ArchiveTarget::Selection => self.selected.iter().cloned().collect(),
        };
        if ids.is_empty() {
            return Err(AssessorError::Validation("no rows selected".into()));
        }

        for (done, id) in ids.iter().enumerate() {
            let result = match op {
                ArchiveOp::Archive => self.backend.archive(id).await,
                ArchiveOp::Unarchive => self.backend.unarchive(id).await,
            };
            if let Err(err) = result {
                warn!(id = %id, accepted = done, error = %err, "archive action failed");
                self.forget(op.source_tab(), &ids[..done]);
                return Err(err);
            }
        }

        info!(count = ids.len(), ?op, "archive action completed");
        self.selected.clear();
        if let Err(err) = self.refresh(op.source_tab()).await {
            warn!(error = %err, "refetch after archive action failed");
            self.forget(op.source_tab(), &ids);
            self.last_error = Some(err);
        }
        Ok(ids.len())
    }

    /// Drop rows the server has already moved out of `tab`.
    fn forget(&mut self, tab: ListTab, ids: &[String]) {
        let rows = match tab {
            ListTab::Active => &mut self.active,
            ListTab::Archived => &mut self.archived,
        };
        rows.retain(|row| !ids.iter().any(|id| id == row.id()));
        for id in ids {
            self.selected.remove(id);
        }
    }
}

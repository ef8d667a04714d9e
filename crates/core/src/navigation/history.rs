//! In-memory history stack

use parking_lot::Mutex;
use tracing::debug;

use super::ports::Navigator;

/// Navigator backed by an in-memory history stack
pub struct HistoryNavigator {
    entries: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self { entries: Mutex::new(vec![initial.into()]) }
    }

    /// Pop the current entry; returns `false` at the first entry.
    pub fn back(&self) -> bool {
        let mut entries = self.entries.lock();
        if entries.len() > 1 {
            entries.pop();
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.entries.lock().last().cloned().unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        debug!(path, "navigate");
        self.entries.lock().push(path.to_string());
    }

    fn replace(&self, path: &str) {
        debug!(path, "replace location");
        let mut entries = self.entries.lock();
        entries.pop();
        entries.push(path.to_string());
    }
}

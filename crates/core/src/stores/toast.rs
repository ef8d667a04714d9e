//! Toast notification queue

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use assessor_domain::impl_domain_status_conversions;

/// Identifier handed back by [`ToastQueue::add_toast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToastId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastSeverity {
    Success,
    Info,
    Warning,
    Error,
}

impl_domain_status_conversions!(ToastSeverity {
    Success => "success",
    Info => "info",
    Warning => "warning",
    Error => "error",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub severity: ToastSeverity,
    pub message: String,
}

/// Bounded FIFO of visible toasts; the oldest is dropped at capacity.
pub struct ToastQueue {
    toasts: Mutex<VecDeque<Toast>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl ToastQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            toasts: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    pub fn add_toast(&self, severity: ToastSeverity, message: impl Into<String>) -> ToastId {
        let id = ToastId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let toast = Toast { id, severity, message: message.into() };
        debug!(id = id.0, severity = %severity, "toast added");

        let mut toasts = self.toasts.lock();
        if toasts.len() >= self.capacity {
            toasts.pop_front();
        }
        toasts.push_back(toast);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.add_toast(ToastSeverity::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> ToastId {
        self.add_toast(ToastSeverity::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.add_toast(ToastSeverity::Error, message)
    }

    /// Returns whether the toast was still visible.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let mut toasts = self.toasts.lock();
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        before != toasts.len()
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        self.toasts.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.toasts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.lock().is_empty()
    }
}

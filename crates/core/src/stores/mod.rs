//! Shared client stores
//!
//! Each store is a plain value handed out behind `Arc`; consumers read
//! snapshots and mutate only through the store's actions.

mod project_cache;
mod refresh;
mod toast;

pub use project_cache::ProjectCache;
pub use refresh::RefreshSignal;
pub use toast::{Toast, ToastId, ToastQueue, ToastSeverity};

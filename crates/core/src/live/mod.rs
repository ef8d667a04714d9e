//! Live-update reconciliation
//!
//! Decides, per pushed event, whether global state (toast + list refresh)
//! is updated or the focused report detail view handles it alone.

mod dispatcher;
mod reconciler;

pub use dispatcher::{LiveEventDispatcher, SubjectSubscription};
pub use reconciler::{LiveUpdateReconciler, ReconcileOutcome};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use assessor_domain::{LiveEvent, LiveEventKind};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::navigation::ports::Navigator;
use crate::navigation::Router;
use crate::stores::{RefreshSignal, ToastId, ToastQueue, ToastSeverity};

/// What the global handler did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The user is on the subject's detail view; that view notifies.
    Deferred,
    /// Toast raised and refresh signalled.
    Notified { toast: ToastId, refresh: u64 },
    /// Identical event seen inside the dedupe window.
    Suppressed,
}

type EventKey = (LiveEventKind, String, String);

/// Global live-event handler
pub struct LiveUpdateReconciler {
    router: Arc<Router>,
    navigator: Arc<dyn Navigator>,
    toasts: Arc<ToastQueue>,
    refresh: Arc<RefreshSignal>,
    dedupe_window: Option<Duration>,
    recent: Mutex<VecDeque<(EventKey, Instant)>>,
}

impl LiveUpdateReconciler {
    pub fn new(
        router: Arc<Router>,
        navigator: Arc<dyn Navigator>,
        toasts: Arc<ToastQueue>,
        refresh: Arc<RefreshSignal>,
    ) -> Self {
        Self {
            router,
            navigator,
            toasts,
            refresh,
            dedupe_window: None,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// Suppress identical events delivered within `window`
    pub fn with_dedupe_window(mut self, window: Option<Duration>) -> Self {
        self.dedupe_window = window;
        self
    }

    pub fn handle(&self, event: &LiveEvent) -> ReconcileOutcome {
        self.handle_at(event, Instant::now())
    }

    /// [`handle`](Self::handle) against an explicit clock
    pub fn handle_at(&self, event: &LiveEvent, now: Instant) -> ReconcileOutcome {
        let location = self.navigator.current_path();
        let focused = !event.report_id.is_empty()
            && self
                .router
                .match_path(&location)
                .is_some_and(|matched| matched.is_report_detail(&event.report_id));

        if focused {
            debug!(report_id = %event.report_id, %location, "deferring live event to detail view");
            return ReconcileOutcome::Deferred;
        }

        if self.is_duplicate(event, now) {
            debug!(report_id = %event.report_id, kind = ?event.kind, "suppressing duplicate live event");
            return ReconcileOutcome::Suppressed;
        }

        let severity = match event.kind {
            LiveEventKind::Complete => ToastSeverity::Success,
            LiveEventKind::Failed => ToastSeverity::Error,
        };
        let toast = self.toasts.add_toast(severity, toast_message(event));
        let refresh = self.refresh.bump();
        info!(report_id = %event.report_id, kind = ?event.kind, refresh, "live event notified");
        ReconcileOutcome::Notified { toast, refresh }
    }

    fn is_duplicate(&self, event: &LiveEvent, now: Instant) -> bool {
        let Some(window) = self.dedupe_window else {
            return false;
        };

        let key = (event.kind, event.report_id.clone(), event.status.clone());
        let mut recent = self.recent.lock();
        while recent.front().is_some_and(|(_, seen)| now.saturating_duration_since(*seen) > window) {
            recent.pop_front();
        }
        if recent.iter().any(|(seen_key, _)| *seen_key == key) {
            return true;
        }
        recent.push_back((key, now));
        false
    }
}

fn toast_message(event: &LiveEvent) -> String {
    if !event.message.trim().is_empty() {
        return event.message.clone();
    }
    match event.kind {
        LiveEventKind::Complete => "Report generation complete".to_string(),
        LiveEventKind::Failed => "Report generation failed".to_string(),
    }
}

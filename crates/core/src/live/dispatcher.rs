use std::sync::Arc;

use assessor_domain::{LiveDelivery, LiveEvent, Session};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, warn};

use super::reconciler::{LiveUpdateReconciler, ReconcileOutcome};

const LOCAL_CHANNEL_CAPACITY: usize = 64;

/// Fans live events out to the global reconciler and to focused views
pub struct LiveEventDispatcher {
    reconciler: Arc<LiveUpdateReconciler>,
    local: broadcast::Sender<LiveEvent>,
}

impl LiveEventDispatcher {
    pub fn new(reconciler: Arc<LiveUpdateReconciler>) -> Self {
        let (local, _) = broadcast::channel(LOCAL_CHANNEL_CAPACITY);
        Self { reconciler, local }
    }

    /// Run the global rule, then hand the event to local subscribers.
    pub fn dispatch(&self, event: LiveEvent) -> ReconcileOutcome {
        let outcome = self.reconciler.handle(&event);
        // No subscribers is the normal case outside detail views.
        let _ = self.local.send(event);
        outcome
    }

    /// Consume deliveries until the sender side closes.
    ///
    /// A delivery is dispatched only while its identity is the signed-in
    /// one; events still buffered from a previous identity are dropped.
    pub async fn run(
        &self,
        mut deliveries: mpsc::Receiver<LiveDelivery>,
        sessions: watch::Receiver<Option<Session>>,
    ) {
        while let Some(LiveDelivery { identity, event }) = deliveries.recv().await {
            let current = sessions.borrow().as_ref().is_some_and(|s| s.user_id == identity);
            if !current {
                debug!(
                    %identity,
                    report_id = %event.report_id,
                    "dropping live event for a previous identity"
                );
                continue;
            }
            self.dispatch(event);
        }
        debug!("live event stream closed");
    }

    /// Events for one subject, for the detail view that owns it
    pub fn subscribe_subject(&self, report_id: impl Into<String>) -> SubjectSubscription {
        SubjectSubscription { report_id: report_id.into(), rx: self.local.subscribe() }
    }
}

/// Filtered receiver returned by [`LiveEventDispatcher::subscribe_subject`]
pub struct SubjectSubscription {
    report_id: String,
    rx: broadcast::Receiver<LiveEvent>,
}

impl SubjectSubscription {
    /// Next event for this subject; `None` once the dispatcher is gone.
    pub async fn next(&mut self) -> Option<LiveEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.report_id == self.report_id => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, report_id = %self.report_id, "detail view lagged behind live events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn report_id(&self) -> &str {
        &self.report_id
    }
}

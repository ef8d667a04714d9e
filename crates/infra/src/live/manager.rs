//! Identity-scoped live connection
//!
//! At most one connection exists per process. It follows the signed-in
//! identity: kept while the identity is unchanged, replaced when it
//! changes, closed on sign-out.

use std::time::Duration;

use assessor_domain::LiveDelivery;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::channel::{ChannelExit, SocketIoChannel};
use super::endpoint::LiveEndpoint;

/// Observable state of the managed connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting { identity: String },
    Connected { identity: String },
}

struct ActiveConnection {
    identity: String,
    cancel: CancellationToken,
    supervisor: JoinHandle<()>,
}

/// Owns the live channel and reconnects it on transport loss
pub struct LiveConnectionManager {
    endpoint: LiveEndpoint,
    reconnect_delay: Duration,
    events: mpsc::Sender<LiveDelivery>,
    active: Mutex<Option<ActiveConnection>>,
    state: watch::Sender<ConnectionState>,
}

impl LiveConnectionManager {
    pub fn new(
        endpoint: LiveEndpoint,
        reconnect_delay: Duration,
        events: mpsc::Sender<LiveDelivery>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self { endpoint, reconnect_delay, events, active: Mutex::new(None), state }
    }

    /// Align the connection with the current identity.
    ///
    /// Must be called from within a tokio runtime.
    pub fn sync_identity(&self, identity: Option<&str>) {
        let mut active = self.active.lock();

        if let (Some(current), Some(wanted)) = (active.as_ref(), identity) {
            if current.identity == wanted && !current.supervisor.is_finished() {
                return;
            }
        }

        if let Some(previous) = active.take() {
            info!(identity = %previous.identity, "closing live channel");
            previous.cancel.cancel();
        }

        let Some(identity) = identity else {
            self.state.send_replace(ConnectionState::Disconnected);
            return;
        };

        let cancel = CancellationToken::new();
        self.state.send_replace(ConnectionState::Connecting { identity: identity.to_string() });
        let supervisor = tokio::spawn(supervise(
            self.endpoint.clone(),
            identity.to_string(),
            self.reconnect_delay,
            self.events.clone(),
            self.state.clone(),
            cancel.clone(),
        ));
        *active = Some(ActiveConnection { identity: identity.to_string(), cancel, supervisor });
    }

    pub fn current_identity(&self) -> Option<String> {
        self.active.lock().as_ref().map(|active| active.identity.clone())
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Close any connection; same as `sync_identity(None)`.
    pub fn shutdown(&self) {
        self.sync_identity(None);
    }
}

impl Drop for LiveConnectionManager {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.cancel.cancel();
        }
    }
}

async fn supervise(
    endpoint: LiveEndpoint,
    identity: String,
    reconnect_delay: Duration,
    events: mpsc::Sender<LiveDelivery>,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
) {
    loop {
        let attempt = tokio::select! {
            () = cancel.cancelled() => return,
            attempt = SocketIoChannel::connect_with_token(
                &endpoint,
                &identity,
                events.clone(),
                cancel.child_token(),
            ) => attempt,
        };

        match attempt {
            Ok(mut subscription) => {
                publish(&state, &cancel, ConnectionState::Connected { identity: identity.clone() });
                match subscription.closed().await {
                    ChannelExit::Unsubscribed | ChannelExit::ReceiverDropped => return,
                    exit => warn!(%identity, ?exit, "live channel lost, reconnecting"),
                }
            }
            Err(e) => warn!(%identity, error = %e, "live channel connect failed"),
        }

        publish(&state, &cancel, ConnectionState::Connecting { identity: identity.clone() });
        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}

// A cancelled supervisor must not overwrite the state of its successor.
fn publish(
    state: &watch::Sender<ConnectionState>,
    cancel: &CancellationToken,
    next: ConnectionState,
) {
    if !cancel.is_cancelled() {
        state.send_replace(next);
    }
}

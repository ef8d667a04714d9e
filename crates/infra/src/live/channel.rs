//! Socket.IO live channel over a WebSocket transport

use std::time::Duration;

use assessor_domain::{AssessorError, LiveDelivery, LiveEvent, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::endpoint::LiveEndpoint;
use super::frame::{self, EngineFrame, SocketFrame};
use crate::errors::InfraError;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a channel task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelExit {
    /// The subscription was cancelled locally.
    Unsubscribed,
    /// The server closed the session or the namespace.
    ServerClosed,
    /// Transport failure or protocol violation.
    TransportLost(String),
    /// Nobody is listening for events anymore.
    ReceiverDropped,
}

/// Handle to a running channel; dropping it cancels the reader task
#[derive(Debug)]
pub struct LiveSubscription {
    identity: String,
    cancel: CancellationToken,
    task: Option<JoinHandle<ChannelExit>>,
}

impl LiveSubscription {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Stop the reader task. Idempotent.
    pub fn unsubscribe(&self) {
        self.cancel.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Wait for the reader task to end.
    pub async fn closed(&mut self) -> ChannelExit {
        let Some(task) = self.task.take() else {
            return ChannelExit::Unsubscribed;
        };
        match task.await {
            Ok(exit) => exit,
            Err(e) => ChannelExit::TransportLost(format!("channel task aborted: {e}")),
        }
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Connects one identity to the backend's Socket.IO endpoint
pub struct SocketIoChannel;

impl SocketIoChannel {
    /// Open the socket, complete the Engine.IO handshake and join the
    /// default namespace. Decoded events are forwarded to `events`, stamped
    /// with `identity`.
    ///
    /// The channel ends with [`ChannelExit::TransportLost`] when the server
    /// stays silent longer than the advertised ping interval plus timeout.
    ///
    /// # Errors
    /// Returns `AssessorError::Network` when the connection or handshake
    /// fails.
    #[instrument(skip(endpoint, events))]
    pub async fn connect(
        endpoint: &LiveEndpoint,
        identity: &str,
        events: mpsc::Sender<LiveDelivery>,
    ) -> Result<LiveSubscription> {
        Self::connect_with_token(endpoint, identity, events, CancellationToken::new()).await
    }

    pub(crate) async fn connect_with_token(
        endpoint: &LiveEndpoint,
        identity: &str,
        events: mpsc::Sender<LiveDelivery>,
        cancel: CancellationToken,
    ) -> Result<LiveSubscription> {
        let url = endpoint.socket_url(identity);
        let (mut socket, _) =
            tokio_tungstenite::connect_async(url.as_str()).await.map_err(InfraError::from)?;

        let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, await_open(&mut socket))
            .await
            .map_err(|_| AssessorError::Network("live channel handshake timed out".into()))??;
        socket
            .send(Message::Text(frame::NAMESPACE_CONNECT.to_string()))
            .await
            .map_err(InfraError::from)?;

        info!(sid = %handshake.sid, ping_interval_ms = handshake.ping_interval, "live channel connected");

        let heartbeat = heartbeat_window(&handshake);
        let task =
            tokio::spawn(read_loop(socket, identity.to_string(), heartbeat, events, cancel.clone()));
        Ok(LiveSubscription { identity: identity.to_string(), cancel, task: Some(task) })
    }
}

async fn await_open(socket: &mut Socket) -> Result<frame::Handshake> {
    while let Some(message) = socket.next().await {
        match message.map_err(InfraError::from)? {
            Message::Text(text) => match frame::decode(&text) {
                Ok(EngineFrame::Open(handshake)) => return Ok(handshake),
                Ok(other) => debug!(?other, "frame before handshake ignored"),
                Err(e) => return Err(AssessorError::Decode(format!("live handshake: {e}"))),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }
    Err(AssessorError::Network("live channel closed during handshake".into()))
}

/// Longest silence tolerated from the server; `None` when the handshake
/// advertised no heartbeat.
fn heartbeat_window(handshake: &frame::Handshake) -> Option<Duration> {
    (handshake.ping_interval > 0)
        .then(|| Duration::from_millis(handshake.ping_interval + handshake.ping_timeout))
}

async fn read_loop(
    mut socket: Socket,
    identity: String,
    heartbeat: Option<Duration>,
    events: mpsc::Sender<LiveDelivery>,
    cancel: CancellationToken,
) -> ChannelExit {
    let mut last_heard = Instant::now();
    let exit = loop {
        let silence = async move {
            match heartbeat {
                Some(window) => tokio::time::sleep_until(last_heard + window).await,
                None => std::future::pending().await,
            }
        };
        let message = tokio::select! {
            () = cancel.cancelled() => break ChannelExit::Unsubscribed,
            () = silence => {
                let window_ms = heartbeat.map_or(0, |w| w.as_millis());
                break ChannelExit::TransportLost(format!("no heartbeat within {window_ms}ms"));
            }
            message = socket.next() => message,
        };
        last_heard = Instant::now();

        let text = match message {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => break ChannelExit::ServerClosed,
            Some(Ok(_)) => continue,
            Some(Err(e)) => break ChannelExit::TransportLost(e.to_string()),
        };

        let frame = match frame::decode(&text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "dropping undecodable live frame");
                continue;
            }
        };

        match frame {
            EngineFrame::Ping(payload) => {
                if let Err(e) = socket.send(Message::Text(frame::pong(&payload))).await {
                    break ChannelExit::TransportLost(e.to_string());
                }
            }
            EngineFrame::Close | EngineFrame::Message(SocketFrame::Disconnect) => {
                break ChannelExit::ServerClosed;
            }
            EngineFrame::Message(SocketFrame::ConnectError(message)) => {
                break ChannelExit::TransportLost(format!("namespace rejected: {message}"));
            }
            EngineFrame::Message(SocketFrame::Event { name, payload }) => {
                match LiveEvent::from_socket(&name, payload) {
                    Ok(Some(event)) => {
                        debug!(event = %name, report_id = %event.report_id, "live event received");
                        let delivery = LiveDelivery { identity: identity.clone(), event };
                        if events.send(delivery).await.is_err() {
                            break ChannelExit::ReceiverDropped;
                        }
                    }
                    Ok(None) => debug!(event = %name, "ignoring live event"),
                    Err(e) => warn!(event = %name, error = %e, "invalid live event payload"),
                }
            }
            EngineFrame::Message(SocketFrame::Connect) => debug!("namespace joined"),
            other => debug!(?other, "live frame ignored"),
        }
    };

    if exit == ChannelExit::Unsubscribed {
        let _ = socket.send(Message::Text(frame::NAMESPACE_DISCONNECT.to_string())).await;
        let _ = socket.close(None).await;
    }
    debug!(?exit, "live channel task finished");
    exit
}

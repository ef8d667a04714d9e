//! Integration tests for the Socket.IO live channel
//!
//! **Coverage:**
//! - Handshake, heartbeat and event forwarding against a real WebSocket server
//! - Unknown events are dropped, subscription cancel sends a namespace leave
//! - A server that stops sending heartbeats is reported as transport loss
//! - Connection manager: reconnect after server close, identity switch, sign-out
//!
//! **Infrastructure:**
//! - In-process `tokio-tungstenite` server on an ephemeral port

use std::sync::Arc;
use std::time::Duration;

use assessor_domain::{LiveConfig, LiveEventKind};
use assessor_infra::live::{
    ChannelExit, ConnectionState, LiveConnectionManager, LiveEndpoint, SocketIoChannel,
};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

const OPEN: &str = r#"0{"sid":"eio-1","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;
const WAIT: Duration = Duration::from_secs(5);

type Uris = Arc<Mutex<Vec<String>>>;

async fn bind() -> (TcpListener, LiveEndpoint) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let live = LiveConfig { url: Some(format!("http://{addr}")), ..LiveConfig::default() };
    let endpoint = LiveEndpoint::from_config(&live, "http://unused.invalid/api").unwrap();
    (listener, endpoint)
}

/// Accept the upgrade, send `open`, expect `40`, acknowledge it.
async fn handshake(stream: TcpStream, uris: Uris) -> WebSocketStream<TcpStream> {
    handshake_with(stream, uris, OPEN).await
}

async fn handshake_with(stream: TcpStream, uris: Uris, open: &str) -> WebSocketStream<TcpStream> {
    let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        uris.lock().push(request.uri().to_string());
        Ok(response)
    };
    let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();

    ws.send(Message::Text(open.to_string())).await.unwrap();
    let joined = ws.next().await.unwrap().unwrap();
    assert_eq!(joined, Message::Text("40".to_string()));
    ws.send(Message::Text(r#"40{"sid":"ns-1"}"#.to_string())).await.unwrap();
    ws
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !condition() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn forwards_generation_events_and_answers_pings() {
    let (listener, endpoint) = bind().await;
    let uris: Uris = Arc::default();
    let (server_done_tx, mut server_done) = mpsc::channel::<Vec<Message>>(1);

    let server_uris = uris.clone();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = handshake(stream, server_uris).await;

        ws.send(Message::Text("2".to_string())).await.unwrap();
        ws.send(Message::Text(r#"42["presence",{"online":3}]"#.to_string())).await.unwrap();
        ws.send(Message::Text(
            r#"42["generation-complete",{"message":"Report ready","reportId":7,"status":"completed"}]"#
                .to_string(),
        ))
        .await
        .unwrap();

        let mut received = Vec::new();
        while let Some(Ok(message)) = ws.next().await {
            let leaving = message == Message::Text("41".to_string());
            received.push(message);
            if leaving {
                break;
            }
        }
        server_done_tx.send(received).await.unwrap();
    });

    let (tx, mut rx) = mpsc::channel(8);
    let mut subscription = SocketIoChannel::connect(&endpoint, "u-7", tx).await.unwrap();
    assert_eq!(subscription.identity(), "u-7");

    let delivery = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(delivery.identity, "u-7");
    let event = delivery.event;
    assert_eq!(event.kind, LiveEventKind::Complete);
    assert_eq!(event.report_id, "7");
    assert_eq!(event.message, "Report ready");

    assert!(uris.lock()[0].contains("userId=u-7"));
    assert!(uris.lock()[0].contains("EIO=4"));

    subscription.unsubscribe();
    assert_eq!(subscription.closed().await, ChannelExit::Unsubscribed);

    let received = timeout(WAIT, server_done.recv()).await.unwrap().unwrap();
    assert!(received.contains(&Message::Text("3".to_string())), "pong expected: {received:?}");
    assert_eq!(received.last(), Some(&Message::Text("41".to_string())));
    assert!(rx.try_recv().is_err(), "presence must not be forwarded");
}

#[tokio::test]
async fn server_close_ends_subscription() {
    let (listener, endpoint) = bind().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = handshake(stream, Arc::default()).await;
        ws.send(Message::Text("41".to_string())).await.unwrap();
        let _ = ws.next().await;
    });

    let (tx, _rx) = mpsc::channel(8);
    let mut subscription = SocketIoChannel::connect(&endpoint, "u-1", tx).await.unwrap();

    let exit = timeout(WAIT, subscription.closed()).await.unwrap();
    assert_eq!(exit, ChannelExit::ServerClosed);
    assert!(!subscription.is_active());
}

#[tokio::test]
async fn silent_server_is_reported_as_transport_loss() {
    let (listener, endpoint) = bind().await;
    let (release_tx, mut release) = mpsc::channel::<()>(1);

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let open = r#"0{"sid":"eio-2","upgrades":[],"pingInterval":50,"pingTimeout":50}"#;
        let _ws = handshake_with(stream, Arc::default(), open).await;
        // Keep the socket open without ever pinging.
        let _ = release.recv().await;
    });

    let (tx, _rx) = mpsc::channel(8);
    let mut subscription = SocketIoChannel::connect(&endpoint, "u-1", tx).await.unwrap();

    let exit = timeout(WAIT, subscription.closed()).await.unwrap();
    assert!(matches!(exit, ChannelExit::TransportLost(ref reason) if reason.contains("heartbeat")), "got {exit:?}");
    drop(release_tx);
}

#[tokio::test]
async fn connect_fails_without_server() {
    let (listener, endpoint) = bind().await;
    drop(listener);

    let (tx, _rx) = mpsc::channel(1);
    assert!(SocketIoChannel::connect(&endpoint, "u-1", tx).await.is_err());
}

#[tokio::test]
async fn manager_follows_identity_and_reconnects() {
    let (listener, endpoint) = bind().await;
    let uris: Uris = Arc::default();

    let server_uris = uris.clone();
    tokio::spawn(async move {
        let mut accepted = 0_u32;
        while let Ok((stream, _)) = listener.accept().await {
            accepted += 1;
            let uris = server_uris.clone();
            let first = accepted == 1;
            tokio::spawn(async move {
                let mut ws = handshake(stream, uris).await;
                if first {
                    // Drop the first session to force a reconnect.
                    let _ = ws.send(Message::Text("1".to_string())).await;
                    return;
                }
                while let Some(Ok(message)) = ws.next().await {
                    if message == Message::Text("41".to_string()) {
                        break;
                    }
                }
            });
        }
    });

    let (tx, _rx) = mpsc::channel(8);
    let manager = LiveConnectionManager::new(endpoint, Duration::from_millis(20), tx);
    let mut state = manager.subscribe_state();

    manager.sync_identity(Some("alice"));
    assert_eq!(manager.current_identity().as_deref(), Some("alice"));
    wait_until(|| uris.lock().len() >= 2).await;
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Connected { identity: "alice".into() }))
        .await
        .unwrap()
        .unwrap();

    manager.sync_identity(Some("alice"));
    sleep(Duration::from_millis(100)).await;
    assert_eq!(uris.lock().len(), 2, "unchanged identity keeps the connection");

    manager.sync_identity(Some("bob"));
    wait_until(|| uris.lock().len() == 3).await;
    assert!(uris.lock()[2].contains("userId=bob"));
    assert!(uris.lock()[..2].iter().all(|uri| uri.contains("userId=alice")));

    manager.sync_identity(None);
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(manager.current_identity(), None);
}

//! Engine.IO v4 / Socket.IO text frame codec
//!
//! Only the subset a listening client needs: handshake, heartbeat,
//! namespace connect/disconnect and named events. Binary attachments are
//! not used by the backend.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Engine.IO `message` + Socket.IO `CONNECT` on the default namespace
pub const NAMESPACE_CONNECT: &str = "40";
/// Engine.IO `message` + Socket.IO `DISCONNECT` on the default namespace
pub const NAMESPACE_DISCONNECT: &str = "41";

/// Server parameters sent with the Engine.IO `open` packet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// Decoded Engine.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum EngineFrame {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketFrame),
    Noop,
}

/// Decoded Socket.IO packet carried in an Engine.IO message
#[derive(Debug, Clone, PartialEq)]
pub enum SocketFrame {
    Connect,
    Disconnect,
    Event { name: String, payload: Value },
    ConnectError(String),
    /// Acks and binary packets; never expected by a listener.
    Unsupported(char),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("empty frame")]
    Empty,
    #[error("unknown packet type '{0}'")]
    UnknownType(char),
    #[error("malformed {kind} packet: {detail}")]
    Malformed { kind: &'static str, detail: String },
}

/// Reply to a server ping, echoing its payload
pub fn pong(payload: &str) -> String {
    format!("3{payload}")
}

/// Decode one WebSocket text message.
///
/// # Errors
/// Returns [`FrameError`] when the frame type is unknown or a payload does
/// not parse.
pub fn decode(text: &str) -> Result<EngineFrame, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let rest = chars.as_str();

    match kind {
        '0' => serde_json::from_str(rest)
            .map(EngineFrame::Open)
            .map_err(|e| FrameError::Malformed { kind: "open", detail: e.to_string() }),
        '1' => Ok(EngineFrame::Close),
        '2' => Ok(EngineFrame::Ping(rest.to_string())),
        '3' => Ok(EngineFrame::Pong(rest.to_string())),
        '4' => decode_socket(rest).map(EngineFrame::Message),
        '6' => Ok(EngineFrame::Noop),
        other => Err(FrameError::UnknownType(other)),
    }
}

fn decode_socket(text: &str) -> Result<SocketFrame, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let body = strip_namespace_and_ack(chars.as_str());

    match kind {
        '0' => Ok(SocketFrame::Connect),
        '1' => Ok(SocketFrame::Disconnect),
        '2' => decode_event(body),
        '4' => {
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| body.to_string());
            Ok(SocketFrame::ConnectError(message))
        }
        '3' | '5' | '6' => Ok(SocketFrame::Unsupported(kind)),
        other => Err(FrameError::UnknownType(other)),
    }
}

/// `/admin,12["x"]` → `["x"]`
fn strip_namespace_and_ack(body: &str) -> &str {
    let body = if body.starts_with('/') {
        body.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        body
    };
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn decode_event(body: &str) -> Result<SocketFrame, FrameError> {
    let malformed = |detail: String| FrameError::Malformed { kind: "event", detail };

    let value: Value = serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    let Value::Array(mut items) = value else {
        return Err(malformed("expected an array".into()));
    };
    if items.is_empty() {
        return Err(malformed("missing event name".into()));
    }

    let name = match items.remove(0) {
        Value::String(name) => name,
        other => return Err(malformed(format!("event name is not a string: {other}"))),
    };
    let payload = if items.is_empty() {
        Value::Object(serde_json::Map::new())
    } else {
        items.remove(0)
    };

    Ok(SocketFrame::Event { name, payload })
}

//! Live-update events pushed by the backend
//!
//! Events are transient: consumed once per delivery, never persisted.

use serde::{Deserialize, Serialize};

use super::serde_helpers::nullable_id_string;
use crate::constants::{EVENT_GENERATION_COMPLETE, EVENT_GENERATION_FAILED};

/// Outcome a background job reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveEventKind {
    Complete,
    Failed,
}

impl LiveEventKind {
    /// Map a socket event name to a kind; unknown names are ignored.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            EVENT_GENERATION_COMPLETE => Some(Self::Complete),
            EVENT_GENERATION_FAILED => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn event_name(self) -> &'static str {
        match self {
            Self::Complete => EVENT_GENERATION_COMPLETE,
            Self::Failed => EVENT_GENERATION_FAILED,
        }
    }
}

/// Payload carried by `generation-complete` / `generation-failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveEventPayload {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "nullable_id_string")]
    pub report_id: String,
    #[serde(default)]
    pub status: String,
}

/// A typed live event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveEvent {
    pub kind: LiveEventKind,
    pub message: String,
    /// Subject used for reconciliation routing. May be empty.
    pub report_id: String,
    pub status: String,
}

/// A live event stamped with the identity whose connection received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveDelivery {
    pub identity: String,
    pub event: LiveEvent,
}

impl LiveEvent {
    pub fn new(kind: LiveEventKind, payload: LiveEventPayload) -> Self {
        Self {
            kind,
            message: payload.message,
            report_id: payload.report_id,
            status: payload.status,
        }
    }

    /// Decode a named socket event; `None` for event names this client ignores.
    ///
    /// # Errors
    /// Returns the serde error when a known event carries an invalid payload.
    pub fn from_socket(
        name: &str,
        payload: serde_json::Value,
    ) -> Result<Option<Self>, serde_json::Error> {
        let Some(kind) = LiveEventKind::from_event_name(name) else {
            return Ok(None);
        };
        let payload: LiveEventPayload = serde_json::from_value(payload)?;
        Ok(Some(Self::new(kind, payload)))
    }
}

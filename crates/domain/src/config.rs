//! Configuration structures
//!
//! Every field has a default so partial JSON/TOML files deserialize cleanly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_RECONNECT_DELAY_MS, DEFAULT_SEARCH_DEBOUNCE_MS, DEFAULT_TOAST_CAPACITY,
};

/// Top-level client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub live: LiveConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// REST API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Total attempts for idempotent requests (GET, PUT); posts and
    /// uploads are always sent once.
    pub max_attempts: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:3000/api".to_string(), timeout_secs: 30, max_attempts: 3 }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Push channel settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Explicit socket origin; derived from `api.base_url` when absent.
    pub url: Option<String>,
    pub path: String,
    pub reconnect_delay_ms: u64,
    /// `0` disables duplicate suppression.
    pub dedupe_window_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            url: None,
            path: "/socket.io/".to_string(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            dedupe_window_ms: 0,
        }
    }
}

impl LiveConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn dedupe_window(&self) -> Option<Duration> {
        (self.dedupe_window_ms > 0).then(|| Duration::from_millis(self.dedupe_window_ms))
    }
}

/// Local persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub credential_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { credential_path: "assessor-credentials.json".to_string() }
    }
}

/// View-layer timing and limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub search_debounce_ms: u64,
    pub toast_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS, toast_capacity: DEFAULT_TOAST_CAPACITY }
    }
}

impl UiConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Tracing output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string(), json: false }
    }
}

//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment when one exists
//! 2. Attempts to load from environment variables
//! 3. Falls back to the first config file found by [`probe_config_paths`]
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ASSESSOR_API_URL`: REST base URL (required for env loading)
//! - `ASSESSOR_API_TIMEOUT_SECS`: per-request timeout
//! - `ASSESSOR_LIVE_URL`: explicit socket origin
//! - `ASSESSOR_LIVE_DEDUPE_MS`: duplicate-event window, `0` disables it
//! - `ASSESSOR_CREDENTIAL_PATH`: token file location
//! - `ASSESSOR_SEARCH_DEBOUNCE_MS`: list search debounce
//! - `ASSESSOR_LOG_JSON`: emit JSON log lines (true/false)
//!
//! ## File Locations
//! `assessor.{toml,json}` then `config.{toml,json}` in the working
//! directory and up to two parents.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use assessor_domain::{AssessorError, ClientConfig, Result};

const CONFIG_STEMS: [&str; 2] = ["assessor", "config"];
const CONFIG_EXTENSIONS: [&str; 2] = ["toml", "json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `AssessorError::Config` if neither the environment nor any
/// config file yields a valid configuration.
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `ASSESSOR_API_URL` is required; everything else keeps its default.
///
/// # Errors
/// Returns `AssessorError::Config` if the URL is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();
    config.api.base_url = env_var("ASSESSOR_API_URL")?;

    if let Some(timeout) = env_parse::<u64>("ASSESSOR_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = timeout;
    }
    if let Ok(url) = std::env::var("ASSESSOR_LIVE_URL") {
        config.live.url = Some(url);
    }
    if let Some(window) = env_parse::<u64>("ASSESSOR_LIVE_DEDUPE_MS")? {
        config.live.dedupe_window_ms = window;
    }
    if let Ok(path) = std::env::var("ASSESSOR_CREDENTIAL_PATH") {
        config.storage.credential_path = path;
    }
    if let Some(debounce) = env_parse::<u64>("ASSESSOR_SEARCH_DEBOUNCE_MS")? {
        config.ui.search_debounce_ms = debounce;
    }
    config.logging.json = env_bool("ASSESSOR_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `AssessorError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AssessorError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AssessorError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AssessorError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration text, format chosen by file extension
///
/// # Errors
/// Returns `AssessorError::Config` on an unknown extension or parse failure.
pub fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AssessorError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AssessorError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(AssessorError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing config file under the working directory or its parents
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(3)
        .flat_map(|dir| {
            CONFIG_STEMS.iter().flat_map(move |stem| {
                CONFIG_EXTENSIONS.iter().map(move |ext| dir.join(format!("{stem}.{ext}")))
            })
        })
        .find(|path| path.is_file())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AssessorError::Config(format!("Missing required environment variable: {}", key)))
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AssessorError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

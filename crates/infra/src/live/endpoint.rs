//! Socket URL derivation

use assessor_domain::constants::LIVE_IDENTITY_QUERY_PARAM;
use assessor_domain::{AssessorError, LiveConfig, Result};
use url::Url;

const API_SUFFIX: &str = "/api";

/// Where the live channel connects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEndpoint {
    origin: Url,
    path: String,
}

impl LiveEndpoint {
    /// Use `live.url` when set, otherwise the API base without its `/api`
    /// suffix. `http(s)` schemes become `ws(s)`.
    ///
    /// # Errors
    /// Returns `AssessorError::Config` for unparseable URLs or unsupported
    /// schemes.
    pub fn from_config(live: &LiveConfig, api_base_url: &str) -> Result<Self> {
        let raw = live.url.as_deref().unwrap_or(api_base_url);
        let mut origin = Url::parse(raw)
            .map_err(|e| AssessorError::Config(format!("invalid live channel URL {raw}: {e}")))?;

        let scheme = match origin.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(AssessorError::Config(format!(
                    "unsupported live channel scheme: {other}"
                )))
            }
        };
        origin
            .set_scheme(scheme)
            .map_err(|()| AssessorError::Config(format!("cannot use scheme {scheme} for {raw}")))?;

        let trimmed = origin.path().trim_end_matches('/');
        let base_path = if live.url.is_none() {
            trimmed.strip_suffix(API_SUFFIX).unwrap_or(trimmed)
        } else {
            trimmed
        }
        .to_string();
        origin.set_path(&base_path);
        origin.set_query(None);
        origin.set_fragment(None);

        let path = if live.path.starts_with('/') { live.path.clone() } else { format!("/{}", live.path) };
        Ok(Self { origin, path })
    }

    /// WebSocket URL for one identity
    pub fn socket_url(&self, identity: &str) -> Url {
        let mut url = self.origin.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}{}", self.path));
        url.query_pairs_mut()
            .append_pair(LIVE_IDENTITY_QUERY_PARAM, identity)
            .append_pair("EIO", "4")
            .append_pair("transport", "websocket");
        url
    }
}

//! Session store
//!
//! Owns the decoded identity. Mutation goes through `login`, `logout` and
//! `rehydrate` only; everything else reads snapshots or subscribes.

use std::sync::Arc;

use assessor_domain::{AssessorError, Credential, Result, Session};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::ports::CredentialStore;

/// Holds the active session and the persisted credential
pub struct SessionStore {
    credentials: Arc<dyn CredentialStore>,
    state: watch::Sender<Option<Session>>,
}

impl SessionStore {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(None);
        Self { credentials, state }
    }

    /// Current session snapshot
    pub fn current(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Identity of the active session, if any
    pub fn user_id(&self) -> Option<String> {
        self.state.borrow().as_ref().map(|session| session.user_id.clone())
    }

    /// Watch session changes (login, logout, rehydration)
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    /// Mark the session authenticated with the given fields
    pub fn login(&self, session: Session) {
        info!(user_id = %session.user_id, role = ?session.role, "session started");
        self.state.send_replace(Some(session));
    }

    /// Clear every session field and the stored credential
    pub fn logout(&self) {
        if let Err(err) = self.credentials.clear() {
            warn!(error = %err, "failed to purge stored credential");
        }
        if self.state.send_replace(None).is_some() {
            info!("session ended");
        }
    }

    /// Persist `token` and start the session it describes.
    ///
    /// # Errors
    /// Returns `Auth` if the token cannot be decoded or is already expired,
    /// or the storage error if persisting fails.
    pub fn establish(&self, token: &str) -> Result<Session> {
        self.establish_at(token, Utc::now())
    }

    pub(crate) fn establish_at(&self, token: &str, now: DateTime<Utc>) -> Result<Session> {
        let credential = Credential::decode_valid_at(token, now)
            .map_err(|err| AssessorError::Auth(format!("unusable credential: {err}")))?;
        self.credentials.save(credential.token())?;
        let session = credential.session();
        self.login(session.clone());
        Ok(session)
    }

    /// Restore the session from the stored credential without network access.
    ///
    /// Expired or malformed credentials are purged and leave the store
    /// unauthenticated.
    pub fn rehydrate(&self) -> Option<Session> {
        self.rehydrate_at(Utc::now())
    }

    /// [`rehydrate`](Self::rehydrate) against an explicit clock
    pub fn rehydrate_at(&self, now: DateTime<Utc>) -> Option<Session> {
        let token = match self.credentials.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no stored credential to rehydrate");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "failed to read stored credential");
                return None;
            }
        };

        match Credential::decode_valid_at(&token, now) {
            Ok(credential) => {
                let session = credential.session();
                self.login(session.clone());
                Some(session)
            }
            Err(err) => {
                info!(reason = %err, "discarding stored credential");
                self.logout();
                None
            }
        }
    }
}

/// In-memory credential store for tests and ephemeral clients
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Mutex::new(Some(token.into())) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assessor_domain::Role;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::TimeZone;

    use super::*;

    fn token(exp: i64) -> String {
        let payload = serde_json::json!({ "id": "u-7", "role": "admin", "name": "Ada", "exp": exp });
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn rehydrates_valid_credential() {
        let credentials = Arc::new(MemoryCredentialStore::with_token(token(1_700_000_600)));
        let store = SessionStore::new(credentials.clone());

        let session = store.rehydrate_at(now()).unwrap();
        assert_eq!(session.user_id, "u-7");
        assert_eq!(session.role, Role::Admin);
        assert!(store.is_authenticated());
        assert!(credentials.load().unwrap().is_some());
    }

    #[test]
    fn expired_credential_is_purged() {
        for exp in [1_600_000_000, 1_699_999_999, 1_700_000_000] {
            let credentials = Arc::new(MemoryCredentialStore::with_token(token(exp)));
            let store = SessionStore::new(credentials.clone());

            assert!(store.rehydrate_at(now()).is_none());
            assert!(!store.is_authenticated());
            assert_eq!(credentials.load().unwrap(), None);
        }
    }

    #[test]
    fn malformed_credential_is_purged() {
        let credentials = Arc::new(MemoryCredentialStore::with_token("garbage"));
        let store = SessionStore::new(credentials.clone());

        assert!(store.rehydrate_at(now()).is_none());
        assert_eq!(credentials.load().unwrap(), None);
    }

    #[test]
    fn logout_clears_session_and_credential() {
        let credentials = Arc::new(MemoryCredentialStore::new());
        let store = SessionStore::new(credentials.clone());
        store.establish_at(&token(1_700_000_600), now()).unwrap();
        assert_eq!(store.user_id().as_deref(), Some("u-7"));

        store.logout();
        assert!(store.current().is_none());
        assert_eq!(credentials.load().unwrap(), None);
    }

    #[test]
    fn establish_rejects_expired_token_without_persisting() {
        let credentials = Arc::new(MemoryCredentialStore::new());
        let store = SessionStore::new(credentials.clone());

        assert!(store.establish_at(&token(1), now()).is_err());
        assert_eq!(credentials.load().unwrap(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn subscribers_observe_changes() {
        let store = SessionStore::new(Arc::new(MemoryCredentialStore::new()));
        let mut rx = store.subscribe();
        store.login(Session { user_id: "u1".into(), role: Role::User, name: "U".into() });

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|s| s.user_id.as_str()), Some("u1"));
    }
}

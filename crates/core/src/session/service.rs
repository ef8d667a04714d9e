//! Authentication service - login, logout, password reset

use std::sync::Arc;

use assessor_domain::constants::LOGIN_PATH;
use assessor_domain::{AssessorError, Result, Session};
use tracing::{info, instrument, warn};

use super::ports::{AuthApi, CredentialRejectionHandler};
use super::store::SessionStore;
use crate::navigation::ports::Navigator;

/// Orchestrates the login/logout lifecycle
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthService {
    pub fn new(
        api: Arc<dyn AuthApi>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { api, session, navigator }
    }

    /// Authenticate and start a session.
    ///
    /// # Errors
    /// Invalid credentials surface as `Auth` for inline display on the form.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AssessorError::Validation("email and password are required".into()));
        }

        let token = self.api.login(email.trim(), password).await.map_err(|err| match err {
            AssessorError::Forbidden(message) => AssessorError::Auth(message),
            other => other,
        })?;

        let session = self.session.establish(&token)?;
        info!(user_id = %session.user_id, "login succeeded");
        Ok(session)
    }

    /// Restore a persisted session at startup
    pub fn rehydrate(&self) -> Option<Session> {
        self.session.rehydrate()
    }

    /// End the session and return to the login page
    pub fn logout(&self) {
        self.session.logout();
        self.navigator.replace(LOGIN_PATH);
    }

    /// # Errors
    /// Propagates the API error; an empty address is rejected locally.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AssessorError::Validation("email is required".into()));
        }
        self.api.request_password_reset(email).await
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }
}

/// Forced logout used by the API client on 401/403 responses
pub struct SessionInvalidator {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionInvalidator {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl CredentialRejectionHandler for SessionInvalidator {
    fn on_credential_rejected(&self) {
        warn!("credential rejected by backend, forcing re-login");
        self.session.logout();
        self.navigator.replace(LOGIN_PATH);
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use parking_lot::Mutex;

    use super::*;
    use crate::navigation::HistoryNavigator;
    use crate::session::ports::CredentialStore;
    use crate::session::MemoryCredentialStore;

    struct FakeAuthApi {
        token: Option<String>,
        resets: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AuthApi for FakeAuthApi {
        async fn login(&self, _email: &str, _password: &str) -> Result<String> {
            self.token.clone().ok_or_else(|| AssessorError::Auth("Invalid credentials".into()))
        }

        async fn request_password_reset(&self, email: &str) -> Result<()> {
            self.resets.lock().push(email.to_string());
            Ok(())
        }
    }

    fn valid_token() -> String {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let payload = serde_json::json!({ "id": "u1", "role": "user", "name": "Uma", "exp": exp });
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    fn service(token: Option<String>) -> (AuthService, Arc<MemoryCredentialStore>, Arc<HistoryNavigator>) {
        let credentials = Arc::new(MemoryCredentialStore::new());
        let session = Arc::new(SessionStore::new(credentials.clone()));
        let navigator = Arc::new(HistoryNavigator::new("/projects"));
        let api = Arc::new(FakeAuthApi { token, resets: Mutex::new(Vec::new()) });
        (AuthService::new(api, session, navigator.clone()), credentials, navigator)
    }

    #[tokio::test]
    async fn login_persists_credential_and_starts_session() {
        let (auth, credentials, _) = service(Some(valid_token()));

        let session = auth.login("uma@example.com", "secret").await.unwrap();
        assert_eq!(session.name, "Uma");
        assert!(auth.session().is_authenticated());
        assert!(credentials.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn invalid_credentials_surface_as_auth_error() {
        let (auth, credentials, _) = service(None);

        let err = auth.login("uma@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AssessorError::Auth(_)));
        assert!(!auth.session().is_authenticated());
        assert_eq!(credentials.load().unwrap(), None);
    }

    #[tokio::test]
    async fn blank_fields_never_reach_the_api() {
        let (auth, _, _) = service(Some(valid_token()));
        assert!(matches!(auth.login(" ", "x").await, Err(AssessorError::Validation(_))));
        assert!(matches!(auth.request_password_reset("").await, Err(AssessorError::Validation(_))));
    }

    #[tokio::test]
    async fn logout_redirects_to_login() {
        let (auth, _, navigator) = service(Some(valid_token()));
        auth.login("uma@example.com", "secret").await.unwrap();

        auth.logout();
        assert!(!auth.session().is_authenticated());
        assert_eq!(navigator.current_path(), LOGIN_PATH);
    }

    #[test]
    fn invalidator_purges_and_redirects() {
        let credentials = Arc::new(MemoryCredentialStore::with_token("t"));
        let session = Arc::new(SessionStore::new(credentials.clone()));
        let navigator = Arc::new(HistoryNavigator::new("/projects/4"));
        let invalidator = SessionInvalidator::new(session, navigator.clone());

        invalidator.on_credential_rejected();
        assert_eq!(credentials.load().unwrap(), None);
        assert_eq!(navigator.current_path(), LOGIN_PATH);
    }
}

//! Login, rehydration, guard and forced-logout flows

mod support;

use std::sync::Arc;

use assessor_core::{
    AuthService, CredentialRejectionHandler, CredentialStore, HistoryNavigator,
    MemoryCredentialStore, Navigator, Resolution, Router, SessionInvalidator, SessionStore,
};
use assessor_domain::constants::{LANDING_PATH, LOGIN_PATH};
use assessor_domain::{AssessorError, Role};
use support::auth::{expired_token, fresh_token, MockAuthApi};

struct Harness {
    credentials: Arc<MemoryCredentialStore>,
    session: Arc<SessionStore>,
    navigator: Arc<HistoryNavigator>,
    auth: AuthService,
}

fn harness(api: MockAuthApi) -> Harness {
    let credentials = Arc::new(MemoryCredentialStore::new());
    let session = Arc::new(SessionStore::new(credentials.clone()));
    let navigator = Arc::new(HistoryNavigator::new(LOGIN_PATH));
    let auth = AuthService::new(Arc::new(api), session.clone(), navigator.clone());
    Harness { credentials, session, navigator, auth }
}

#[tokio::test]
async fn login_persists_credential_and_unlocks_guarded_routes() {
    let token = fresh_token("42", "project_manager");
    let h = harness(MockAuthApi::new("secret", token.clone()));
    let router = Router::standard();

    assert_eq!(
        router.resolve("/projects/new", h.session.current().as_ref()),
        Resolution::Redirect(LOGIN_PATH.to_string())
    );

    let session = h.auth.login("pm@example.com", "secret").await.unwrap();
    assert_eq!(session.user_id, "42");
    assert_eq!(session.role, Role::ProjectManager);
    assert_eq!(h.credentials.load().unwrap().as_deref(), Some(token.as_str()));

    assert!(matches!(
        router.resolve("/projects/new", h.session.current().as_ref()),
        Resolution::Render(_)
    ));
    assert_eq!(
        router.resolve(LOGIN_PATH, h.session.current().as_ref()),
        Resolution::Redirect(LANDING_PATH.to_string())
    );
}

#[tokio::test]
async fn wrong_password_is_an_inline_auth_error() {
    let h = harness(MockAuthApi::new("secret", fresh_token("42", "user")));

    let err = h.auth.login("user@example.com", "nope").await.unwrap_err();
    assert!(matches!(err, AssessorError::Auth(_)));
    assert!(!h.session.is_authenticated());
    assert_eq!(h.credentials.load().unwrap(), None);
}

#[tokio::test]
async fn login_with_expired_token_is_rejected() {
    let h = harness(MockAuthApi::new("secret", expired_token("42", "user")));

    assert!(h.auth.login("user@example.com", "secret").await.is_err());
    assert!(!h.session.is_authenticated());
}

#[test]
fn rehydration_restores_only_unexpired_credentials() {
    let valid = Arc::new(MemoryCredentialStore::with_token(fresh_token("7", "admin")));
    let session = SessionStore::new(valid.clone());
    assert_eq!(session.rehydrate().map(|s| s.role), Some(Role::Admin));
    assert!(valid.load().unwrap().is_some());

    let expired = Arc::new(MemoryCredentialStore::with_token(expired_token("7", "admin")));
    let session = SessionStore::new(expired.clone());
    assert!(session.rehydrate().is_none());
    assert!(!session.is_authenticated());
    assert_eq!(expired.load().unwrap(), None);
}

#[tokio::test]
async fn credential_rejection_forces_relogin() {
    let h = harness(MockAuthApi::new("secret", fresh_token("42", "user")));
    h.auth.login("user@example.com", "secret").await.unwrap();
    h.navigator.navigate("/projects/9");

    let invalidator = SessionInvalidator::new(h.session.clone(), h.navigator.clone());
    invalidator.on_credential_rejected();

    assert!(!h.session.is_authenticated());
    assert_eq!(h.credentials.load().unwrap(), None);
    assert_eq!(h.navigator.current_path(), LOGIN_PATH);
}

#[tokio::test]
async fn logout_clears_session_and_returns_to_login() {
    let h = harness(MockAuthApi::new("secret", fresh_token("42", "user")));
    h.auth.login("user@example.com", "secret").await.unwrap();
    let mut changes = h.session.subscribe();

    h.auth.logout();

    changes.changed().await.unwrap();
    assert!(changes.borrow().is_none());
    assert_eq!(h.navigator.current_path(), LOGIN_PATH);
}

#[tokio::test]
async fn password_reset_is_forwarded() {
    let api = Arc::new(MockAuthApi::new("secret", fresh_token("1", "user")));
    let credentials = Arc::new(MemoryCredentialStore::new());
    let session = Arc::new(SessionStore::new(credentials));
    let auth = AuthService::new(api.clone(), session, Arc::new(HistoryNavigator::new(LOGIN_PATH)));

    auth.request_password_reset("  someone@example.com ").await.unwrap();
    assert!(auth.request_password_reset(" ").await.is_err());
    assert_eq!(api.reset_requests(), vec!["someone@example.com".to_string()]);
}

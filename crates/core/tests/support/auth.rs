//! Auth fakes and credential fixtures

use assessor_core::AuthApi;
use assessor_domain::{AssessorError, Result as DomainResult};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use parking_lot::Mutex;

/// Build an unsigned bearer token carrying the given claims.
pub fn token(user_id: &str, role: &str, name: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = serde_json::json!({ "id": user_id, "role": role, "name": name, "exp": exp });
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{payload}.signature")
}

/// Token valid for the next hour.
pub fn fresh_token(user_id: &str, role: &str) -> String {
    token(user_id, role, "Test User", Utc::now().timestamp() + 3600)
}

/// Token that expired a minute ago.
pub fn expired_token(user_id: &str, role: &str) -> String {
    token(user_id, role, "Test User", Utc::now().timestamp() - 60)
}

/// `AuthApi` that accepts one password and hands out a fixed token.
pub struct MockAuthApi {
    password: String,
    token: String,
    reset_requests: Mutex<Vec<String>>,
}

impl MockAuthApi {
    pub fn new(password: impl Into<String>, token: impl Into<String>) -> Self {
        Self { password: password.into(), token: token.into(), reset_requests: Mutex::new(Vec::new()) }
    }

    pub fn reset_requests(&self) -> Vec<String> {
        self.reset_requests.lock().clone()
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, _email: &str, password: &str) -> DomainResult<String> {
        if password == self.password {
            Ok(self.token.clone())
        } else {
            Err(AssessorError::Auth("Invalid email or password".into()))
        }
    }

    async fn request_password_reset(&self, email: &str) -> DomainResult<()> {
        self.reset_requests.lock().push(email.to_string());
        Ok(())
    }
}

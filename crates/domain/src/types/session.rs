//! Session, role and credential types
//!
//! The credential is a JWT issued by the backend. The client never verifies
//! its signature; it only reads the payload to restore the session and to
//! discard tokens whose embedded expiry has passed.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::serde_helpers::id_string;

/// Closed set of roles the backend assigns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "basic", alias = "basic_user")]
    User,
    #[serde(alias = "pm", alias = "manager")]
    ProjectManager,
    Admin,
}

impl Role {
    /// Project managers and admins may create projects.
    pub fn can_manage_projects(self) -> bool {
        matches!(self, Self::ProjectManager | Self::Admin)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Authenticated session fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub name: String,
}

impl From<&CredentialClaims> for Session {
    fn from(claims: &CredentialClaims) -> Self {
        Self { user_id: claims.id.clone(), role: claims.role, name: claims.name.clone() }
    }
}

/// Claims embedded in the credential payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    #[serde(alias = "userId", alias = "sub", deserialize_with = "id_string")]
    pub id: String,
    pub role: Role,
    #[serde(default, alias = "username")]
    pub name: String,
    /// Expiry in seconds since the Unix epoch.
    pub exp: i64,
}

impl CredentialClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// Reasons a stored token cannot be used
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential must have three dot-separated segments, found {0}")]
    Malformed(usize),

    #[error("credential payload is not valid base64: {0}")]
    Encoding(String),

    #[error("credential payload is not valid claims JSON: {0}")]
    Claims(String),

    #[error("credential expired at {0}")]
    Expired(i64),
}

/// Decoded bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    claims: CredentialClaims,
}

impl Credential {
    /// Decode the payload segment without any network access.
    ///
    /// # Errors
    /// Returns [`CredentialError`] when the token is not a three-segment JWT,
    /// the payload is not URL-safe base64, or the claims are missing/invalid.
    pub fn decode(token: &str) -> Result<Self, CredentialError> {
        let token = token.trim();
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(CredentialError::Malformed(parts.len()));
        }

        let payload = parts[1];
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .or_else(|_| URL_SAFE.decode(payload))
            .map_err(|err| CredentialError::Encoding(err.to_string()))?;

        let claims: CredentialClaims = serde_json::from_slice(&bytes)
            .map_err(|err| CredentialError::Claims(err.to_string()))?;

        Ok(Self { token: token.to_string(), claims })
    }

    /// Decode and reject tokens whose expiry is not after `now`.
    ///
    /// # Errors
    /// Any decode error, or [`CredentialError::Expired`].
    pub fn decode_valid_at(token: &str, now: DateTime<Utc>) -> Result<Self, CredentialError> {
        let credential = Self::decode(token)?;
        if credential.is_expired_at(now) {
            return Err(CredentialError::Expired(credential.claims.exp));
        }
        Ok(credential)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.claims.exp <= now.timestamp()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &CredentialClaims {
        &self.claims
    }

    pub fn session(&self) -> Session {
        Session::from(&self.claims)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn token_with(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn decodes_claims_with_aliases() {
        let token = token_with(&serde_json::json!({
            "userId": 17,
            "role": "project_manager",
            "name": "Dana",
            "exp": 1_800_000_000_i64
        }));

        let credential = Credential::decode(&token).unwrap();
        assert_eq!(credential.claims().id, "17");
        assert_eq!(credential.claims().role, Role::ProjectManager);
        assert_eq!(credential.session().name, "Dana");
        assert_eq!(credential.token(), token);
    }

    #[test]
    fn rejects_expired_credential() {
        let token = token_with(&serde_json::json!({
            "id": "u1", "role": "admin", "name": "Root", "exp": 1_600_000_000_i64
        }));

        let err = Credential::decode_valid_at(&token, now()).unwrap_err();
        assert_eq!(err, CredentialError::Expired(1_600_000_000));
    }

    #[test]
    fn expiry_equal_to_now_is_expired() {
        let token = token_with(&serde_json::json!({
            "id": "u1", "role": "user", "exp": now().timestamp()
        }));

        assert!(Credential::decode(&token).unwrap().is_expired_at(now()));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(Credential::decode("not-a-jwt"), Err(CredentialError::Malformed(1)));
        assert!(matches!(Credential::decode("a.!!!.c"), Err(CredentialError::Encoding(_))));

        let unknown_role = token_with(&serde_json::json!({
            "id": "u1", "role": "superuser", "exp": 1_800_000_000_i64
        }));
        assert!(matches!(Credential::decode(&unknown_role), Err(CredentialError::Claims(_))));
    }

    #[test]
    fn role_capabilities() {
        assert!(!Role::User.can_manage_projects());
        assert!(Role::ProjectManager.can_manage_projects());
        assert!(Role::Admin.can_manage_projects());
        assert!(Role::Admin.is_admin());
        assert!(!Role::ProjectManager.is_admin());
    }
}

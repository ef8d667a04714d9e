//! Port interfaces for credential persistence and authentication
//!
//! These traits define the boundaries between the session logic and the
//! storage/HTTP implementations in `assessor-infra`.

use assessor_domain::Result;
use async_trait::async_trait;

/// Persistence for the single bearer token that survives restarts
pub trait CredentialStore: Send + Sync {
    /// Read the stored token, if any
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored token
    fn save(&self, token: &str) -> Result<()>;

    /// Remove the stored token; removing an absent token is not an error
    fn clear(&self) -> Result<()>;
}

/// Authentication endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token
    async fn login(&self, email: &str, password: &str) -> Result<String>;

    /// Ask the backend to send a password-reset message
    async fn request_password_reset(&self, email: &str) -> Result<()>;
}

/// Called by the API client when the backend rejects the credential
pub trait CredentialRejectionHandler: Send + Sync {
    fn on_credential_rejected(&self);
}

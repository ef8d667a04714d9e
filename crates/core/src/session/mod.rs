//! Session lifecycle: store, credential persistence port and auth service

pub mod ports;
mod service;
mod store;

pub use service::{AuthService, SessionInvalidator};
pub use store::{MemoryCredentialStore, SessionStore};

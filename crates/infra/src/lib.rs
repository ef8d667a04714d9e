//! # Assessor Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Configuration loading (environment, `.env`, TOML/JSON files)
//! - Retrying HTTP client and the authenticated backend API client
//! - File-backed credential store
//! - Socket.IO live channel and the identity-scoped connection manager
//!
//! ## Architecture
//! - Implements traits defined in `assessor-core`
//! - Contains all "impure" code (HTTP, sockets, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod live;
pub mod storage;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientConfig, ApiError, AssessorApi, ProjectListBackend, ReportListBackend,
};
pub use errors::InfraError;
pub use http::HttpClient;
pub use live::{LiveConnectionManager, LiveEndpoint, LiveSubscription, SocketIoChannel};
pub use storage::FileCredentialStore;

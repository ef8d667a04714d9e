//! Backend REST API
//!
//! - [`client::ApiClient`]: credential injection and central 401/403 handling
//! - [`endpoints::AssessorApi`]: typed auth and project-setup endpoints
//! - [`listing`]: project and report list backends

pub mod client;
pub mod endpoints;
pub mod errors;
pub mod listing;

pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use endpoints::AssessorApi;
pub use errors::{ApiError, ApiErrorCategory};
pub use listing::{ProjectListBackend, ReportListBackend};

//! # Assessor App
//!
//! Composition root for the assessor client: wires configuration, stores,
//! the backend API and the live channel into one [`AppContext`].

pub mod context;
pub mod logging;

pub use context::AppContext;
pub use logging::init_tracing;

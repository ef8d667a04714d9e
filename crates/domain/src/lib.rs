//! # Assessor Domain
//!
//! Business domain types for the AI Assessor client.
//!
//! This crate contains:
//! - Session, role and credential-claim types
//! - Project/report list rows and reference data
//! - Live-update events
//! - The project draft and template analysis model
//! - Domain error types, configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other assessor crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;

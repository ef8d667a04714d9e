//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! client.

// Persistence
pub const CREDENTIAL_STORAGE_KEY: &str = "token";

// Routes
pub const LOGIN_PATH: &str = "/login";
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";
pub const LANDING_PATH: &str = "/projects";

// Live channel events
pub const EVENT_GENERATION_COMPLETE: &str = "generation-complete";
pub const EVENT_GENERATION_FAILED: &str = "generation-failed";
pub const LIVE_IDENTITY_QUERY_PARAM: &str = "userId";

// UI timing and capacity
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_TOAST_CAPACITY: usize = 20;
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";
pub const GENERIC_SUBMISSION_ERROR: &str = "Failed to create project";

//! HTTP transport with retries for idempotent requests

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, RetryPolicy};

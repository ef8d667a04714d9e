//! Shared test helpers for `assessor-core` integration tests.
//!
//! In-memory fakes for the core ports plus a credential builder, so the
//! flow tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod auth;
pub mod listing;

//! HTTP API for the bintrack community waste-bin tracker.
//!
//! Split into a library so the integration tests can mount the router
//! against an ephemeral listener; `main.rs` only does process wiring.

/// Environment-driven server settings.
pub mod config;
/// Router, handlers, and error-to-status mapping.
pub mod http;

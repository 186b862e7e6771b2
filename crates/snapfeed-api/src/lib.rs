//! Snapfeed HTTP API
//!
//! This crate provides the Axum router for Snapfeed: signup and login,
//! the session-protected feed, and owner-checked post mutations.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};

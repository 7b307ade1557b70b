//! Propdesk REST API
//!
//! This crate provides the Axum-based HTTP API for Propdesk: the
//! authentication endpoints, the guarded CRM resource endpoints, and the
//! operational endpoints (health, metrics, diagnostics).

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};

//! API routes

mod appointments;
pub mod auth;
mod clients;
mod dashboard;
mod documents;
mod expenses;
mod health;
pub mod metrics;
mod tasks;
pub mod types;

use axum::Router;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

// Re-export commonly used types for external use
#[allow(unused_imports)]
pub use auth::RequireSession;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Authentication
        .merge(auth::routes())
        .merge(auth::public_page_routes(state.keys.clone()))
        // Dashboard and CRM resources (session-guarded)
        .merge(dashboard::routes())
        .merge(clients::routes())
        .merge(tasks::routes())
        .merge(appointments::routes())
        .merge(documents::routes())
        .merge(expenses::routes())
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}

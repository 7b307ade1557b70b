//! Application state

use propdesk_auth::SessionKeys;
use propdesk_db::Database;
use std::sync::Arc;

/// Prometheus recorder handle used by the /metrics endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
///
/// Constructed once at startup and read-only afterwards; handlers never
/// mutate it.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub keys: Arc<SessionKeys>,
    /// Mark session cookies `Secure` (production-like deployments)
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(db: Database, keys: Arc<SessionKeys>, cookie_secure: bool) -> Self {
        Self {
            db,
            keys,
            cookie_secure,
        }
    }
}

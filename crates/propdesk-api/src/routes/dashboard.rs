//! Dashboard summary route

use axum::{Json, Router, extract::State, routing::get};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireSession;
use super::types::DashboardResponse;

/// GET /dashboard
///
/// Per-user workload counts; also the landing spot for authenticated
/// callers redirected away from the login/register pages.
async fn dashboard(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let clients = state.db.count_clients(user.id).await?;
    let tasks = state.db.count_tasks(user.id).await?;
    let appointments = state.db.count_appointments(user.id).await?;
    let documents = state.db.count_documents(user.id).await?;
    let expenses = state.db.count_expenses(user.id).await?;

    Ok(Json(DashboardResponse {
        user,
        clients,
        tasks,
        appointments,
        documents,
        expenses,
    }))
}

/// Create dashboard routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

//! Client (contact) routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use tracing::{debug, info};

use propdesk_db::{Client, NewClient};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireSession;
use super::types::ClientPayload;

fn to_new_client(payload: ClientPayload) -> Result<NewClient, ApiError> {
    if payload.name.is_empty() {
        return Err(ApiError::BadRequest("Client name is required".to_string()));
    }
    Ok(NewClient {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        notes: payload.notes,
    })
}

/// GET /api/clients
async fn list_clients(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(state.db.list_clients(user.id).await?))
}

/// POST /api/clients
async fn create_client(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Json(payload): Json<ClientPayload>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    let client = state.db.insert_client(user.id, to_new_client(payload)?).await?;

    info!("User {} created client {}", user.id, client.id);
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/clients/{id}
async fn get_client(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Client>, ApiError> {
    let client = state
        .db
        .get_client(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Client: {}", id)))?;

    Ok(Json(client))
}

/// PUT /api/clients/{id}
async fn update_client(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<Client>, ApiError> {
    debug!("User {} updating client {}", user.id, id);

    let client = state
        .db
        .update_client(id, user.id, to_new_client(payload)?)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Client: {}", id)))?;

    Ok(Json(client))
}

/// DELETE /api/clients/{id}
async fn delete_client(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_client(id, user.id).await? {
        info!("User {} deleted client {}", user.id, id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Client: {}", id)))
    }
}

/// Create client routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list_clients))
        .route("/api/clients", post(create_client))
        .route("/api/clients/{id}", get(get_client))
        .route("/api/clients/{id}", put(update_client))
        .route("/api/clients/{id}", delete(delete_client))
}

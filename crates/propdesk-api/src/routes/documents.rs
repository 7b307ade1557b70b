//! Document routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use tracing::info;

use propdesk_db::{Document, NewDocument};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireSession;
use super::types::DocumentPayload;

fn to_new_document(payload: DocumentPayload) -> Result<NewDocument, ApiError> {
    if payload.title.is_empty() {
        return Err(ApiError::BadRequest("Document title is required".to_string()));
    }
    Ok(NewDocument {
        title: payload.title,
        client: payload.client,
        property: payload.property,
        doc_type: payload.doc_type,
        status: payload.status.unwrap_or_else(|| "pending".to_string()),
        size: payload.size,
        url: payload.url,
    })
}

/// GET /api/documents
async fn list_documents(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.db.list_documents(user.id).await?))
}

/// POST /api/documents
async fn create_document(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Json(payload): Json<DocumentPayload>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let document = state
        .db
        .insert_document(user.id, to_new_document(payload)?)
        .await?;

    info!("User {} created document {}", user.id, document.id);
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /api/documents/{id}
async fn get_document(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .db
        .get_document(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Document: {}", id)))?;

    Ok(Json(document))
}

/// PUT /api/documents/{id}
async fn update_document(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DocumentPayload>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .db
        .update_document(id, user.id, to_new_document(payload)?)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Document: {}", id)))?;

    Ok(Json(document))
}

/// DELETE /api/documents/{id}
async fn delete_document(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_document(id, user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Document: {}", id)))
    }
}

/// Create document routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/documents", get(list_documents))
        .route("/api/documents", post(create_document))
        .route("/api/documents/{id}", get(get_document))
        .route("/api/documents/{id}", put(update_document))
        .route("/api/documents/{id}", delete(delete_document))
}

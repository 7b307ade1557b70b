//! Task routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use tracing::info;

use propdesk_db::{NewTask, Task, TaskPriority, TaskStatus};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireSession;
use super::types::TaskPayload;

fn to_new_task(payload: TaskPayload) -> Result<NewTask, ApiError> {
    if payload.title.is_empty() {
        return Err(ApiError::BadRequest("Task title is required".to_string()));
    }
    Ok(NewTask {
        title: payload.title,
        description: payload.description,
        due_date: payload.due_date,
        priority: payload.priority.unwrap_or(TaskPriority::Medium),
        status: payload.status.unwrap_or(TaskStatus::Pending),
    })
}

/// GET /api/tasks
async fn list_tasks(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.db.list_tasks(user.id).await?))
}

/// POST /api/tasks
async fn create_task(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.db.insert_task(user.id, to_new_task(payload)?).await?;

    info!("User {} created task {}", user.id, task.id);
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/{id}
async fn get_task(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .db
        .get_task(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task: {}", id)))?;

    Ok(Json(task))
}

/// PUT /api/tasks/{id}
async fn update_task(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .db
        .update_task(id, user.id, to_new_task(payload)?)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task: {}", id)))?;

    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
async fn delete_task(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_task(id, user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Task: {}", id)))
    }
}

/// Create task routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks))
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/{id}", get(get_task))
        .route("/api/tasks/{id}", put(update_task))
        .route("/api/tasks/{id}", delete(delete_task))
}

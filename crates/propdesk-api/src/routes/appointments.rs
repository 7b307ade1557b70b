//! Appointment routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use tracing::info;

use propdesk_db::{Appointment, NewAppointment};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireSession;
use super::types::AppointmentPayload;

fn to_new_appointment(payload: AppointmentPayload) -> Result<NewAppointment, ApiError> {
    if payload.title.is_empty() {
        return Err(ApiError::BadRequest("Appointment title is required".to_string()));
    }
    Ok(NewAppointment {
        title: payload.title,
        client: payload.client,
        date: payload.date,
        time: payload.time,
        location: payload.location,
        kind: payload.kind,
    })
}

/// GET /api/appointments
async fn list_appointments(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    Ok(Json(state.db.list_appointments(user.id).await?))
}

/// POST /api/appointments
async fn create_appointment(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Json(payload): Json<AppointmentPayload>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let appointment = state
        .db
        .insert_appointment(user.id, to_new_appointment(payload)?)
        .await?;

    info!("User {} created appointment {}", user.id, appointment.id);
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// GET /api/appointments/{id}
async fn get_appointment(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = state
        .db
        .get_appointment(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Appointment: {}", id)))?;

    Ok(Json(appointment))
}

/// PUT /api/appointments/{id}
async fn update_appointment(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AppointmentPayload>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = state
        .db
        .update_appointment(id, user.id, to_new_appointment(payload)?)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Appointment: {}", id)))?;

    Ok(Json(appointment))
}

/// DELETE /api/appointments/{id}
async fn delete_appointment(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_appointment(id, user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Appointment: {}", id)))
    }
}

/// Create appointment routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/appointments", get(list_appointments))
        .route("/api/appointments", post(create_appointment))
        .route("/api/appointments/{id}", get(get_appointment))
        .route("/api/appointments/{id}", put(update_appointment))
        .route("/api/appointments/{id}", delete(delete_appointment))
}

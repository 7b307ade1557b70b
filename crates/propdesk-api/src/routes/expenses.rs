//! Expense routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use tracing::info;

use propdesk_db::{Expense, ExpenseStatus, NewExpense};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireSession;
use super::types::ExpensePayload;

fn to_new_expense(payload: ExpensePayload) -> Result<NewExpense, ApiError> {
    if payload.title.is_empty() {
        return Err(ApiError::BadRequest("Expense title is required".to_string()));
    }
    if !payload.amount.is_finite() || payload.amount < 0.0 {
        return Err(ApiError::BadRequest("Expense amount must be a non-negative number".to_string()));
    }
    Ok(NewExpense {
        title: payload.title,
        amount: payload.amount,
        category: payload.category,
        property: payload.property,
        date: payload.date,
        status: payload.status.unwrap_or(ExpenseStatus::Pending),
        receipt: payload.receipt,
    })
}

/// GET /api/expenses
async fn list_expenses(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    Ok(Json(state.db.list_expenses(user.id).await?))
}

/// POST /api/expenses
async fn create_expense(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Json(payload): Json<ExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = state
        .db
        .insert_expense(user.id, to_new_expense(payload)?)
        .await?;

    info!("User {} created expense {}", user.id, expense.id);
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/expenses/{id}
async fn get_expense(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, ApiError> {
    let expense = state
        .db
        .get_expense(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Expense: {}", id)))?;

    Ok(Json(expense))
}

/// PUT /api/expenses/{id}
async fn update_expense(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpensePayload>,
) -> Result<Json<Expense>, ApiError> {
    let expense = state
        .db
        .update_expense(id, user.id, to_new_expense(payload)?)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Expense: {}", id)))?;

    Ok(Json(expense))
}

/// DELETE /api/expenses/{id}
async fn delete_expense(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_expense(id, user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Expense: {}", id)))
    }
}

/// Create expense routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/expenses", get(list_expenses))
        .route("/api/expenses", post(create_expense))
        .route("/api/expenses/{id}", get(get_expense))
        .route("/api/expenses/{id}", put(update_expense))
        .route("/api/expenses/{id}", delete(delete_expense))
}

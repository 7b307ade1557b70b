//! Request/Response DTOs for the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use propdesk_auth::SessionUser;
use propdesk_db::{ExpenseStatus, TaskPriority, TaskStatus};

// ==================== Auth Types ====================

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// User response (never carries the password hash)
#[derive(Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Info body served on the public-only login/register pages
#[derive(Serialize)]
pub struct PageInfo {
    pub page: &'static str,
    pub message: &'static str,
}

// ==================== Dashboard Types ====================

/// Per-user dashboard summary
#[derive(Serialize)]
pub struct DashboardResponse {
    pub user: SessionUser,
    pub clients: i64,
    pub tasks: i64,
    pub appointments: i64,
    pub documents: i64,
    pub expenses: i64,
}

// ==================== Resource Payloads ====================

/// Client create/replace payload
#[derive(Deserialize)]
pub struct ClientPayload {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Task create/replace payload
#[derive(Deserialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

/// Appointment create/replace payload
#[derive(Deserialize)]
pub struct AppointmentPayload {
    pub title: String,
    pub client: Option<String>,
    pub date: DateTime<Utc>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub kind: Option<String>,
}

/// Document create/replace payload
#[derive(Deserialize)]
pub struct DocumentPayload {
    pub title: String,
    pub client: Option<String>,
    pub property: Option<String>,
    pub doc_type: Option<String>,
    pub status: Option<String>,
    pub size: Option<i64>,
    pub url: Option<String>,
}

/// Expense create/replace payload
#[derive(Deserialize)]
pub struct ExpensePayload {
    pub title: String,
    pub amount: f64,
    pub category: Option<String>,
    pub property: Option<String>,
    pub date: DateTime<Utc>,
    pub status: Option<ExpenseStatus>,
    pub receipt: Option<String>,
}

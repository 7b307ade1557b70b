//! Task operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewTask, Task};
use crate::repository::Database;

impl Database {
    /// Insert a new task for a user
    pub async fn insert_task(&self, user_id: i64, task: NewTask) -> Result<Task, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date, priority, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(task.priority.as_str())
        .bind(task.status.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Task {
            id,
            user_id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            created_at: now,
            updated_at: now,
        })
    }

    /// List a user's tasks, newest first
    pub async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, description, due_date, priority, status, created_at, updated_at
            FROM tasks
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Task::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get one of a user's tasks by ID
    pub async fn get_task(&self, id: i64, user_id: i64) -> Result<Option<Task>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, title, description, due_date, priority, status, created_at, updated_at
            FROM tasks
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Task::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Replace a task's fields; returns the updated row if it belonged to the user
    pub async fn update_task(
        &self,
        id: i64,
        user_id: i64,
        task: NewTask,
    ) -> Result<Option<Task>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, due_date = ?, priority = ?, status = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING id, user_id, title, description, due_date, priority, status, created_at, updated_at
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(task.priority.as_str())
        .bind(task.status.as_str())
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Task::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Delete a user's task
    pub async fn delete_task(&self, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a user's tasks
    pub async fn count_tasks(&self, user_id: i64) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM tasks WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

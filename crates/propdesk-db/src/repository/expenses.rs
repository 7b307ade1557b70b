//! Expense operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Expense, NewExpense};
use crate::repository::Database;

impl Database {
    /// Insert a new expense for a user
    pub async fn insert_expense(
        &self,
        user_id: i64,
        expense: NewExpense,
    ) -> Result<Expense, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO expenses (user_id, title, amount, category, property, date, status, receipt, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&expense.title)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.property)
        .bind(expense.date.to_rfc3339())
        .bind(expense.status.as_str())
        .bind(&expense.receipt)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Expense {
            id,
            user_id,
            title: expense.title,
            amount: expense.amount,
            category: expense.category,
            property: expense.property,
            date: expense.date,
            status: expense.status,
            receipt: expense.receipt,
            created_at: now,
            updated_at: now,
        })
    }

    /// List a user's expenses, most recent spend first
    pub async fn list_expenses(&self, user_id: i64) -> Result<Vec<Expense>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, amount, category, property, date, status, receipt, created_at, updated_at
            FROM expenses
            WHERE user_id = ?
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Expense::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get one of a user's expenses by ID
    pub async fn get_expense(&self, id: i64, user_id: i64) -> Result<Option<Expense>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, title, amount, category, property, date, status, receipt, created_at, updated_at
            FROM expenses
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Expense::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Replace an expense's fields; returns the updated row if it belonged to the user
    pub async fn update_expense(
        &self,
        id: i64,
        user_id: i64,
        expense: NewExpense,
    ) -> Result<Option<Expense>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET title = ?, amount = ?, category = ?, property = ?, date = ?, status = ?, receipt = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING id, user_id, title, amount, category, property, date, status, receipt, created_at, updated_at
            "#,
        )
        .bind(&expense.title)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.property)
        .bind(expense.date.to_rfc3339())
        .bind(expense.status.as_str())
        .bind(&expense.receipt)
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Expense::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Delete a user's expense
    pub async fn delete_expense(&self, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a user's expenses
    pub async fn count_expenses(&self, user_id: i64) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM expenses WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

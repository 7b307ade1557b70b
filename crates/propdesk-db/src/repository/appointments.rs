//! Appointment operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Appointment, NewAppointment};
use crate::repository::Database;

impl Database {
    /// Insert a new appointment for a user
    pub async fn insert_appointment(
        &self,
        user_id: i64,
        appointment: NewAppointment,
    ) -> Result<Appointment, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO appointments (user_id, title, client, date, time, location, kind, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&appointment.title)
        .bind(&appointment.client)
        .bind(appointment.date.to_rfc3339())
        .bind(&appointment.time)
        .bind(&appointment.location)
        .bind(&appointment.kind)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Appointment {
            id,
            user_id,
            title: appointment.title,
            client: appointment.client,
            date: appointment.date,
            time: appointment.time,
            location: appointment.location,
            kind: appointment.kind,
            created_at: now,
            updated_at: now,
        })
    }

    /// List a user's appointments in calendar order
    pub async fn list_appointments(&self, user_id: i64) -> Result<Vec<Appointment>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, client, date, time, location, kind, created_at, updated_at
            FROM appointments
            WHERE user_id = ?
            ORDER BY date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Appointment::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get one of a user's appointments by ID
    pub async fn get_appointment(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Appointment>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, title, client, date, time, location, kind, created_at, updated_at
            FROM appointments
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Appointment::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Replace an appointment's fields; returns the updated row if it belonged to the user
    pub async fn update_appointment(
        &self,
        id: i64,
        user_id: i64,
        appointment: NewAppointment,
    ) -> Result<Option<Appointment>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET title = ?, client = ?, date = ?, time = ?, location = ?, kind = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING id, user_id, title, client, date, time, location, kind, created_at, updated_at
            "#,
        )
        .bind(&appointment.title)
        .bind(&appointment.client)
        .bind(appointment.date.to_rfc3339())
        .bind(&appointment.time)
        .bind(&appointment.location)
        .bind(&appointment.kind)
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Appointment::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Delete a user's appointment
    pub async fn delete_appointment(&self, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a user's appointments
    pub async fn count_appointments(&self, user_id: i64) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM appointments WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

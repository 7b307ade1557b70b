//! Client (contact) operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Client, NewClient};
use crate::repository::Database;

impl Database {
    /// Insert a new client for a user
    pub async fn insert_client(&self, user_id: i64, client: NewClient) -> Result<Client, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO clients (user_id, name, email, phone, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.notes)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Client {
            id,
            user_id,
            name: client.name,
            email: client.email,
            phone: client.phone,
            notes: client.notes,
            created_at: now,
            updated_at: now,
        })
    }

    /// List a user's clients, newest first
    pub async fn list_clients(&self, user_id: i64) -> Result<Vec<Client>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, email, phone, notes, created_at, updated_at
            FROM clients
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Client::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get one of a user's clients by ID
    pub async fn get_client(&self, id: i64, user_id: i64) -> Result<Option<Client>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, name, email, phone, notes, created_at, updated_at
            FROM clients
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Client::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Replace a client's fields; returns the updated row if it belonged to the user
    pub async fn update_client(
        &self,
        id: i64,
        user_id: i64,
        client: NewClient,
    ) -> Result<Option<Client>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = ?, email = ?, phone = ?, notes = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING id, user_id, name, email, phone, notes, created_at, updated_at
            "#,
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.notes)
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Client::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Delete a user's client
    pub async fn delete_client(&self, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a user's clients
    pub async fn count_clients(&self, user_id: i64) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM clients WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    async fn seeded_db() -> (Database, i64) {
        let db = Database::new_in_memory().await.unwrap();
        let user = db
            .insert_user(NewUser {
                name: "Agent".to_string(),
                email: "agent@x.com".to_string(),
                password_hash: "$argon2id$stub".to_string(),
            })
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_client_crud_scoped_by_user() {
        let (db, user_id) = seeded_db().await;

        let created = db
            .insert_client(
                user_id,
                NewClient {
                    name: "Buyer One".to_string(),
                    email: Some("buyer@x.com".to_string()),
                    phone: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(db.list_clients(user_id).await.unwrap().len(), 1);
        // Another user sees nothing
        assert!(db.get_client(created.id, user_id + 1).await.unwrap().is_none());
        assert!(db.list_clients(user_id + 1).await.unwrap().is_empty());

        let updated = db
            .update_client(
                created.id,
                user_id,
                NewClient {
                    name: "Buyer One".to_string(),
                    email: Some("buyer@x.com".to_string()),
                    phone: Some("555-0101".to_string()),
                    notes: Some("prefers evenings".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("555-0101"));

        assert!(db.delete_client(created.id, user_id).await.unwrap());
        assert!(!db.delete_client(created.id, user_id).await.unwrap());
    }
}

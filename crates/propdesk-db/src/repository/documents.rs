//! Document operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Document, NewDocument};
use crate::repository::Database;

impl Database {
    /// Insert a new document record for a user
    pub async fn insert_document(
        &self,
        user_id: i64,
        document: NewDocument,
    ) -> Result<Document, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO documents (user_id, title, client, property, doc_type, status, size, url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&document.title)
        .bind(&document.client)
        .bind(&document.property)
        .bind(&document.doc_type)
        .bind(&document.status)
        .bind(document.size)
        .bind(&document.url)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Document {
            id,
            user_id,
            title: document.title,
            client: document.client,
            property: document.property,
            doc_type: document.doc_type,
            status: document.status,
            size: document.size,
            url: document.url,
            created_at: now,
            updated_at: now,
        })
    }

    /// List a user's documents, newest first
    pub async fn list_documents(&self, user_id: i64) -> Result<Vec<Document>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, client, property, doc_type, status, size, url, created_at, updated_at
            FROM documents
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Document::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get one of a user's documents by ID
    pub async fn get_document(&self, id: i64, user_id: i64) -> Result<Option<Document>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, title, client, property, doc_type, status, size, url, created_at, updated_at
            FROM documents
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Document::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Replace a document's fields; returns the updated row if it belonged to the user
    pub async fn update_document(
        &self,
        id: i64,
        user_id: i64,
        document: NewDocument,
    ) -> Result<Option<Document>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET title = ?, client = ?, property = ?, doc_type = ?, status = ?, size = ?, url = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING id, user_id, title, client, property, doc_type, status, size, url, created_at, updated_at
            "#,
        )
        .bind(&document.title)
        .bind(&document.client)
        .bind(&document.property)
        .bind(&document.doc_type)
        .bind(&document.status)
        .bind(document.size)
        .bind(&document.url)
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Document::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Delete a user's document
    pub async fn delete_document(&self, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a user's documents
    pub async fn count_documents(&self, user_id: i64) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM documents WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

//! User operations and credential-store introspection

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::{Database, USERS_TABLE_DDL};

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// The email must already be normalized (lower-cased) by the caller. A
    /// unique-constraint violation maps to `DbError::Duplicate` so racing
    /// registrations behave the same as the pre-check path.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if DbError::is_unique_violation(&e) {
                DbError::Duplicate(format!("User with email '{}' already exists", user.email))
            } else {
                DbError::Connection(e)
            }
        })?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email (expects a normalized, lower-cased email)
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Count registered users
    pub async fn count_users(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }

    // ==================== Schema Introspection ====================

    /// Check whether the users table exists
    pub async fn users_table_exists(&self) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'users'
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(result.is_some())
    }

    /// List the column names of the users table
    pub async fn users_table_columns(&self) -> Result<Vec<String>, DbError> {
        let rows = sqlx::query("PRAGMA table_info(users)")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    /// Create the users table with the minimal required schema.
    ///
    /// Idempotent; calling it when the table already exists is a no-op.
    pub async fn create_users_table(&self) -> Result<(), DbError> {
        sqlx::query(USERS_TABLE_DDL).execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::new_in_memory().await.unwrap()
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$hashhashhash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;

        let user = db.insert_user(new_user("ann@x.com")).await.unwrap();
        assert!(user.id > 0);

        let found = db.get_user_by_email("ann@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.name, "Ann");

        let by_id = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;

        db.insert_user(new_user("ann@x.com")).await.unwrap();
        let err = db.insert_user(new_user("ann@x.com")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_count_users() {
        let db = test_db().await;
        assert_eq!(db.count_users().await.unwrap(), 0);

        db.insert_user(new_user("ann@x.com")).await.unwrap();
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_schema_introspection() {
        let db = test_db().await;

        assert!(db.users_table_exists().await.unwrap());
        let columns = db.users_table_columns().await.unwrap();
        for required in ["id", "name", "email", "password_hash"] {
            assert!(columns.iter().any(|c| c == required), "missing {}", required);
        }

        // Repair is idempotent
        db.create_users_table().await.unwrap();
        db.create_users_table().await.unwrap();
    }
}

//! PostgreSQL user store.
//!
//! Sessions live in a `TEXT[]` column. Every session mutation is a single
//! `UPDATE ... RETURNING` so Postgres serializes concurrent writers on the row.

use super::UserStore;
use crate::error::AuthError;
use crate::models::{User, UserId};

use async_trait::async_trait;
use sqlx::PgPool;

/// User store over a Postgres `users` table
#[derive(Debug, Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Create the `users` table if it does not exist
    pub async fn run_migrations(&self) -> Result<(), AuthError> {
        tracing::info!("Running session auth database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                tokens TEXT[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&self.db)
        .await?;

        tracing::info!("Session auth migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.db)
            .await?;
        Ok(users)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AuthError> {
        // A unique violation converts to UsernameTaken
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    async fn update_user_tokens(&self, id: UserId, tokens: Vec<String>) -> Result<User, AuthError> {
        sqlx::query_as("UPDATE users SET tokens = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(tokens)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn append_token(&self, id: UserId, token: &str) -> Result<User, AuthError> {
        sqlx::query_as("UPDATE users SET tokens = array_append(tokens, $2) WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(token)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn remove_token(&self, id: UserId, token: &str) -> Result<User, AuthError> {
        // array_remove drops every occurrence; slice around the first one instead
        sqlx::query_as(
            r#"
            UPDATE users SET tokens = CASE
                WHEN array_position(tokens, $2) IS NULL THEN tokens
                ELSE tokens[:array_position(tokens, $2) - 1]
                     || tokens[array_position(tokens, $2) + 1:]
            END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(token)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AuthError::UserNotFound)
    }

    async fn clear_tokens(&self, id: UserId) -> Result<User, AuthError> {
        sqlx::query_as("UPDATE users SET tokens = '{}' WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, AuthError> {
        sqlx::query_as(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AuthError::UserNotFound)
    }

    async fn delete_user(&self, id: UserId) -> Result<User, AuthError> {
        sqlx::query_as("DELETE FROM users WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

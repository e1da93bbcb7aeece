//! Store decorator that bounds every call with a deadline.

use super::UserStore;
use crate::error::AuthError;
use crate::models::{User, UserId};

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Wraps a store so that a hung call fails with `AuthError::Store`
pub struct TimeoutStore<S> {
    inner: S,
    limit: Duration,
}

impl<S: UserStore> TimeoutStore<S> {
    pub fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, AuthError>> + Send,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(op, limit_ms = self.limit.as_millis() as u64, "User store call timed out");
                Err(AuthError::Store(format!("{op} timed out")))
            }
        }
    }
}

#[async_trait]
impl<S: UserStore> UserStore for TimeoutStore<S> {
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        self.bounded("get_user_by_id", self.inner.get_user_by_id(id))
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        self.bounded("get_user_by_username", self.inner.get_user_by_username(username))
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        self.bounded("list_users", self.inner.list_users()).await
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AuthError> {
        self.bounded("create_user", self.inner.create_user(username, password_hash))
            .await
    }

    async fn update_user_tokens(&self, id: UserId, tokens: Vec<String>) -> Result<User, AuthError> {
        self.bounded("update_user_tokens", self.inner.update_user_tokens(id, tokens))
            .await
    }

    async fn append_token(&self, id: UserId, token: &str) -> Result<User, AuthError> {
        self.bounded("append_token", self.inner.append_token(id, token))
            .await
    }

    async fn remove_token(&self, id: UserId, token: &str) -> Result<User, AuthError> {
        self.bounded("remove_token", self.inner.remove_token(id, token))
            .await
    }

    async fn clear_tokens(&self, id: UserId) -> Result<User, AuthError> {
        self.bounded("clear_tokens", self.inner.clear_tokens(id)).await
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, AuthError> {
        self.bounded(
            "update_profile",
            self.inner.update_profile(id, username, password_hash),
        )
        .await
    }

    async fn delete_user(&self, id: UserId) -> Result<User, AuthError> {
        self.bounded("delete_user", self.inner.delete_user(id)).await
    }
}

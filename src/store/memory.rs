//! In-process user store backed by a locked map.
//!
//! Each mutation runs under the write lock, which makes the session
//! primitives atomic per record.

use super::{remove_first, UserStore};
use crate::error::AuthError;
use crate::models::{User, UserId};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    next_id: UserId,
    users: BTreeMap<UserId, User>,
}

/// User store kept in memory, for tests and single-process deployments
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn mutate<F>(&self, id: UserId, f: F) -> Result<User, AuthError>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        f(user);
        Ok(user.clone())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AuthError> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.username == username) {
            return Err(AuthError::UsernameTaken);
        }

        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            tokens: Vec::new(),
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_user_tokens(&self, id: UserId, tokens: Vec<String>) -> Result<User, AuthError> {
        self.mutate(id, move |user| user.tokens = tokens).await
    }

    async fn append_token(&self, id: UserId, token: &str) -> Result<User, AuthError> {
        self.mutate(id, |user| user.tokens.push(token.to_string()))
            .await
    }

    async fn remove_token(&self, id: UserId, token: &str) -> Result<User, AuthError> {
        self.mutate(id, |user| remove_first(&mut user.tokens, token))
            .await
    }

    async fn clear_tokens(&self, id: UserId) -> Result<User, AuthError> {
        self.mutate(id, |user| user.tokens.clear()).await
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, AuthError> {
        let mut inner = self.inner.write().await;

        if let Some(name) = username {
            if inner
                .users
                .values()
                .any(|u| u.username == name && u.id != id)
            {
                return Err(AuthError::UsernameTaken);
            }
        }

        let user = inner.users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        if let Some(name) = username {
            user.username = name.to_string();
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash.to_string();
        }

        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<User, AuthError> {
        self.inner
            .write()
            .await
            .users
            .remove(&id)
            .ok_or(AuthError::UserNotFound)
    }
}

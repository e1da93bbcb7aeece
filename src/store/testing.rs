//! In-memory store with switchable faults for tests.

use super::{MemoryUserStore, UserStore};
use crate::error::AuthError;
use crate::models::{User, UserId};

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Memory store that counts lookups and can hang or fail on demand
#[derive(Default)]
pub(crate) struct FaultyStore {
    inner: MemoryUserStore,
    pub lookups: AtomicUsize,
    pub hang_lookups: AtomicBool,
    pub fail_appends: AtomicBool,
}

impl FaultyStore {
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn hang_lookups(&self) {
        self.hang_lookups.store(true, Ordering::SeqCst);
    }

    pub fn fail_appends(&self) {
        self.fail_appends.store(true, Ordering::SeqCst);
    }

    async fn lookup(&self) {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.hang_lookups.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl UserStore for FaultyStore {
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        self.lookup().await;
        self.inner.get_user_by_id(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        self.lookup().await;
        self.inner.get_user_by_username(username).await
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        self.inner.list_users().await
    }

    async fn create_user(&self, username: &str, hash: &str) -> Result<User, AuthError> {
        self.inner.create_user(username, hash).await
    }

    async fn update_user_tokens(&self, id: UserId, t: Vec<String>) -> Result<User, AuthError> {
        self.inner.update_user_tokens(id, t).await
    }

    async fn append_token(&self, id: UserId, token: &str) -> Result<User, AuthError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(AuthError::Store("append_token failed".to_string()));
        }
        self.inner.append_token(id, token).await
    }

    async fn remove_token(&self, id: UserId, token: &str) -> Result<User, AuthError> {
        self.inner.remove_token(id, token).await
    }

    async fn clear_tokens(&self, id: UserId) -> Result<User, AuthError> {
        self.inner.clear_tokens(id).await
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: Option<&str>,
        hash: Option<&str>,
    ) -> Result<User, AuthError> {
        self.inner.update_profile(id, username, hash).await
    }

    async fn delete_user(&self, id: UserId) -> Result<User, AuthError> {
        self.inner.delete_user(id).await
    }
}

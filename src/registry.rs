//! Session Registry
//!
//! The per-user list of live session tokens. Signature checks alone cannot
//! express logout; a token counts as a session only while it is listed here.

use crate::error::AuthError;
use crate::models::{User, UserId};
use crate::store::UserStore;

use std::sync::Arc;

/// Tracks which issued tokens are still live sessions
#[derive(Clone)]
pub struct SessionRegistry {
    store: Arc<dyn UserStore>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Record a new session for the user
    pub async fn add_token(&self, user_id: UserId, token: &str) -> Result<User, AuthError> {
        let user = self.store.append_token(user_id, token).await?;
        tracing::debug!(
            user_id = %user_id,
            sessions = user.session_count(),
            "Session added"
        );
        Ok(user)
    }

    /// Revoke one session; revoking an unknown token is a no-op
    pub async fn remove_token(&self, user_id: UserId, token: &str) -> Result<User, AuthError> {
        let user = self.store.remove_token(user_id, token).await?;
        tracing::debug!(
            user_id = %user_id,
            sessions = user.session_count(),
            "Session revoked"
        );
        Ok(user)
    }

    /// Revoke every session of the user
    pub async fn clear_tokens(&self, user_id: UserId) -> Result<User, AuthError> {
        let user = self.store.clear_tokens(user_id).await?;
        tracing::info!(user_id = %user_id, "All sessions revoked");
        Ok(user)
    }

    /// Whether the token is a live session of the user
    ///
    /// Costs one store read. The [`Authenticator`](crate::authenticator::Authenticator)
    /// already holds the loaded user after its existence check, so it asks
    /// [`User::has_token`] directly; both answer from the same token list.
    pub async fn contains(&self, user_id: UserId, token: &str) -> Result<bool, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(user.has_token(token))
    }
}

//! User Store
//!
//! The identity store the authentication core reads and writes. Session
//! mutations are expressed as atomic primitives (`append_token`,
//! `remove_token`, `clear_tokens`) so that concurrent logins and logouts for
//! the same user never lose each other's writes.

mod memory;
mod postgres;
mod timeout;

#[cfg(test)]
pub(crate) mod testing;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use timeout::TimeoutStore;

use crate::error::AuthError;
use crate::models::{User, UserId};

use async_trait::async_trait;

/// Persistent user records
///
/// Lookups return `Ok(None)` for absent users. Mutations return the updated
/// record, or `AuthError::UserNotFound` when the id does not exist.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, AuthError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    async fn list_users(&self) -> Result<Vec<User>, AuthError>;

    /// Insert a user with an empty session list
    ///
    /// Fails with `AuthError::UsernameTaken` if the username exists.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AuthError>;

    /// Replace the whole session list
    async fn update_user_tokens(&self, id: UserId, tokens: Vec<String>) -> Result<User, AuthError>;

    /// Atomically append one session token
    async fn append_token(&self, id: UserId, token: &str) -> Result<User, AuthError>;

    /// Atomically remove the first occurrence of a session token
    ///
    /// Removing an absent token leaves the list unchanged.
    async fn remove_token(&self, id: UserId, token: &str) -> Result<User, AuthError>;

    /// Atomically empty the session list
    async fn clear_tokens(&self, id: UserId) -> Result<User, AuthError>;

    /// Replace the username and/or password digest
    ///
    /// Fails with `AuthError::UsernameTaken` if the new username belongs to
    /// another user.
    async fn update_profile(
        &self,
        id: UserId,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, AuthError>;

    /// Delete a user, returning the removed record
    async fn delete_user(&self, id: UserId) -> Result<User, AuthError>;
}

/// Remove the first occurrence of `token`, keeping the order of the rest
pub(crate) fn remove_first(tokens: &mut Vec<String>, token: &str) {
    if let Some(pos) = tokens.iter().position(|t| t == token) {
        tokens.remove(pos);
    }
}

//! Authentication Models
//!
//! Data structures for authentication requests, responses, and stored users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Numeric user identifier assigned by the store
pub type UserId = i64;

// ============================================
// Database Entities
// ============================================

/// User entity from the store
///
/// The password digest and session tokens are never serialized. Anything
/// leaving the crate goes through [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing, default)]
    pub tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the token is one of this user's live sessions
    pub fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.tokens.len()
    }
}

// ============================================
// Request DTOs
// ============================================

/// Registration and login request
///
/// Missing fields deserialize as empty so they fail validation instead of
/// the JSON extractor.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile update request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: Option<String>,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

// ============================================
// Response DTOs
// ============================================

/// Public user data without the password digest or session tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}

/// Registration / login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

// ============================================
// JWT Claims
// ============================================

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID, decimal string)
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp, absent for non-expiring sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issuer
    pub iss: String,
    /// JWT ID, distinguishes sessions issued in the same second
    pub jti: uuid::Uuid,
}

impl SessionClaims {
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

//! Authentication Error Types
//!
//! Centralized error handling for all authentication operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Why the authenticator refused a credential
///
/// Kept for logging and tests. Every variant produces the same response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No `Authorization: Bearer <token>` header
    MissingCredential,
    /// Signature, issuer or expiry check failed
    InvalidToken,
    /// Token verified but its user no longer exists
    UnknownUser,
    /// Token verified but is not in the user's session list
    RevokedToken,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::MissingCredential => "missing_credential",
            Rejection::InvalidToken => "invalid_token",
            Rejection::UnknownUser => "unknown_user",
            Rejection::RevokedToken => "revoked_token",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authentication errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Username or password was incorrect")]
    InvalidCredentials,

    #[error("Please authenticate")]
    Unauthorized(Rejection),

    #[error("Could not find user with that id")]
    UserNotFound,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// Rejection cause, if this is an authentication rejection
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            AuthError::Unauthorized(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<Rejection> for AuthError {
    fn from(reason: Rejection) -> Self {
        AuthError::Unauthorized(reason)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AuthError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
            ),
            AuthError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "user_not_found",
                self.to_string(),
            ),
            AuthError::UsernameTaken => (
                StatusCode::CONFLICT,
                "username_taken",
                self.to_string(),
            ),
            AuthError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
            ),
            AuthError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                "Server configuration error".to_string(),
            ),
            AuthError::Store(_) | AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "error": error_code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AuthError::UsernameTaken
            }
            _ => {
                tracing::error!("Database error: {:?}", err);
                AuthError::Store(err.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errs
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .map(|e| match &e.message {
                Some(message) => message.to_string(),
                None => e.code.to_string(),
            })
            .collect();
        messages.sort();
        AuthError::Validation(messages.join(", "))
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("JWT error: {:?}", err);
        AuthError::Unauthorized(Rejection::InvalidToken)
    }
}

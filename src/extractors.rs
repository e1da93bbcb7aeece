//! Authentication Extractors
//!
//! Axum extractors for the session attached by
//! [`middleware::authenticate`](crate::middleware::authenticate).

use crate::authenticator::AuthSession;
use crate::error::{AuthError, Rejection};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// The authenticated session; rejects with 401 when there is none
#[derive(Debug, Clone)]
pub struct CurrentSession(pub AuthSession);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .map(CurrentSession)
            .ok_or(AuthError::Unauthorized(Rejection::MissingCredential))
    }
}

/// The authenticated session if there is one, for optional-auth routes
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<AuthSession>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(parts.extensions.get::<AuthSession>().cloned()))
    }
}

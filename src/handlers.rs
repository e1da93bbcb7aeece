//! User HTTP Handlers
//!
//! REST API endpoints for accounts and sessions.

use crate::authenticator::AuthMode;
use crate::error::AuthError;
use crate::extractors::{CurrentSession, MaybeSession};
use crate::middleware;
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

// ============================================
// Route Builder
// ============================================

/// Create user and session routes
pub fn create_routes(auth_service: Arc<AuthService>) -> Router {
    let authenticator = auth_service.authenticator();

    // Public routes (no authentication required)
    let public = Router::new()
        .route("/users", get(list_users).post(register))
        .route("/users/login", post(login))
        .route("/users/:id", get(get_user));

    // Routes that behave differently for anonymous callers
    let optional = Router::new()
        .route("/users/me", get(get_current_user))
        .layer(axum_middleware::from_fn_with_state(
            authenticator.with_mode(AuthMode::Optional),
            middleware::authenticate,
        ));

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/users", put(update_profile).delete(delete_account))
        .route("/users/logout", post(logout))
        .route("/users/logoutAll", post(logout_all))
        .layer(axum_middleware::from_fn_with_state(
            authenticator.with_mode(AuthMode::Required),
            middleware::authenticate,
        ));

    Router::new()
        .merge(public)
        .merge(optional)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(auth_service)
}

// ============================================
// Registration / Login
// ============================================

/// POST /users
///
/// Register a new account and open its first session
pub async fn register(
    State(auth): State<AuthState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.register(req).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /users/login
///
/// Authenticate with username and password and open a new session
pub async fn login(
    State(auth): State<AuthState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.login(req).await?;

    Ok(Json(response))
}

// ============================================
// Logout
// ============================================

/// POST /users/logout
///
/// Revoke the session that made this request
pub async fn logout(
    State(auth): State<AuthState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, AuthError> {
    let user = auth.logout(&session).await?;

    Ok(Json(user))
}

/// POST /users/logoutAll
///
/// Revoke every session of the current user
pub async fn logout_all(
    State(auth): State<AuthState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, AuthError> {
    let user = auth.logout_all(&session).await?;

    Ok(Json(user))
}

// ============================================
// User Profile
// ============================================

/// GET /users
pub async fn list_users(State(auth): State<AuthState>) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(auth.list_users().await?))
}

/// GET /users/:id
pub async fn get_user(
    State(auth): State<AuthState>,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(auth.get_user(id).await?))
}

/// GET /users/me
///
/// The current user, or `null` for anonymous callers
pub async fn get_current_user(MaybeSession(session): MaybeSession) -> impl IntoResponse {
    Json(serde_json::json!({
        "user": session.map(|s| s.user)
    }))
}

/// PUT /users
///
/// Change username and/or password
pub async fn update_profile(
    State(auth): State<AuthState>,
    CurrentSession(session): CurrentSession,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let user = auth.update_profile(session.user_id(), req).await?;

    Ok(Json(user))
}

/// DELETE /users
///
/// Delete the current account
pub async fn delete_account(
    State(auth): State<AuthState>,
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, AuthError> {
    let user = auth.delete_account(session.user_id()).await?;

    Ok(Json(user))
}

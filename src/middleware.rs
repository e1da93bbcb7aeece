//! Authentication Middleware
//!
//! One middleware function serves both required and optional routes; the
//! [`Authenticator`]'s mode decides what a rejection does. Store failures end
//! the request in either mode.
//!
//! ```rust,ignore
//! let required = from_fn_with_state(auth.with_mode(AuthMode::Required), authenticate);
//! let optional = from_fn_with_state(auth.with_mode(AuthMode::Optional), authenticate);
//! ```

use crate::authenticator::{AuthMode, Authenticator};

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Authenticate the request
///
/// On success the [`AuthSession`](crate::authenticator::AuthSession) is stored
/// in request extensions for the extractors.
pub async fn authenticate(
    State(auth): State<Authenticator>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    match auth.authenticate(header.as_deref()).await {
        Ok(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(err) => match (auth.mode(), err.rejection()) {
            (AuthMode::Required, Some(reason)) => {
                tracing::debug!(reason = %reason, "Request rejected");
                err.into_response()
            }
            (AuthMode::Optional, Some(reason)) => {
                tracing::debug!(reason = %reason, "Continuing anonymously");
                next.run(req).await
            }
            // Store failures are never mistaken for an anonymous caller
            (mode, None) => {
                tracing::error!(?mode, "Authentication failed: {}", err);
                err.into_response()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticator::AuthSession;
    use crate::extractors::MaybeSession;
    use crate::password::test_config;
    use crate::store::testing::FaultyStore;
    use crate::store::{MemoryUserStore, TimeoutStore, UserStore};
    use crate::token::TokenIssuer;

    use axum::{
        body::{to_bytes, Body},
        extract::Extension,
        http::StatusCode,
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn whoami(session: Option<Extension<AuthSession>>) -> String {
        match session {
            Some(Extension(session)) => session.user.username,
            None => "anonymous".to_string(),
        }
    }

    async fn maybe(MaybeSession(session): MaybeSession) -> String {
        session.map_or("anonymous".to_string(), |s| s.user.username)
    }

    async fn app(mode: AuthMode) -> (Router, String) {
        let store = Arc::new(MemoryUserStore::new());
        let issuer = TokenIssuer::new(&test_config());
        let user = store.create_user("alice", "digest").await.unwrap();
        let token = issuer.issue(user.id).unwrap();
        store.append_token(user.id, &token).await.unwrap();

        let auth = Authenticator::new(issuer, store).with_mode(mode);
        let router = Router::new()
            .route("/whoami", get(whoami))
            .route("/maybe", get(maybe))
            .layer(from_fn_with_state(auth, authenticate));
        (router, token)
    }

    /// Router whose store hangs on lookups, bounded by a short timeout
    async fn unavailable_app(mode: AuthMode) -> (Router, String) {
        let store = FaultyStore::default();
        let issuer = TokenIssuer::new(&test_config());
        let user = store.create_user("alice", "digest").await.unwrap();
        let token = issuer.issue(user.id).unwrap();
        store.append_token(user.id, &token).await.unwrap();
        store.hang_lookups();

        let store = TimeoutStore::new(store, Duration::from_millis(30));
        let auth = Authenticator::new(issuer, Arc::new(store)).with_mode(mode);
        let router = Router::new()
            .route("/maybe", get(maybe))
            .layer(from_fn_with_state(auth, authenticate));
        (router, token)
    }

    async fn call(router: Router, uri: &str, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_required_mode() {
        let (router, token) = app(AuthMode::Required).await;

        let (status, body) = call(router.clone(), "/whoami", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice");

        let (status, _) = call(router.clone(), "/whoami", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(router, "/whoami", Some("Bearer garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_optional_mode() {
        let (router, token) = app(AuthMode::Optional).await;

        let (status, body) = call(router.clone(), "/maybe", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice");

        let (status, body) = call(router.clone(), "/maybe", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");

        let (status, body) = call(router, "/maybe", Some("Bearer garbage")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_rejections_share_one_body() {
        let (router, _) = app(AuthMode::Required).await;

        let (_, missing) = call(router.clone(), "/whoami", None).await;
        let (_, invalid) = call(router, "/whoami", Some("Bearer garbage")).await;
        assert_eq!(missing, invalid);
    }

    #[tokio::test]
    async fn test_store_failure_ends_request_in_both_modes() {
        for mode in [AuthMode::Required, AuthMode::Optional] {
            let (router, token) = unavailable_app(mode).await;

            let (status, body) = call(router, "/maybe", Some(&format!("Bearer {token}"))).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "mode {mode:?}");
            assert_ne!(body, "anonymous");
        }
    }

    #[tokio::test]
    async fn test_optional_mode_skips_store_without_credential() {
        let (router, _) = unavailable_app(AuthMode::Optional).await;

        let (status, body) = call(router, "/maybe", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }
}

//! Authenticator
//!
//! Turns the credential header of a request into an [`AuthSession`] or a
//! [`Rejection`]. The checks run in a fixed order:
//!
//! 1. a `Bearer` token is present
//! 2. the token signature, issuer and expiry verify (no I/O)
//! 3. the user named by the token exists
//! 4. the token is still one of that user's sessions
//!
//! Store failures in steps 3 and 4 surface as `AuthError::Store`, never as a
//! rejection.

use crate::error::{AuthError, Rejection};
use crate::models::{PublicUser, UserId};
use crate::store::UserStore;
use crate::token::TokenIssuer;

use std::sync::Arc;

/// Whether a failed authentication ends the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Rejections answer 401
    Required,
    /// Rejections continue the request without an identity
    Optional,
}

/// An authenticated request identity
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Sanitized user record
    pub user: PublicUser,
    /// The verified token this request presented
    pub token: String,
}

impl AuthSession {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

/// Validates bearer tokens against the issuer and the session registry
#[derive(Clone)]
pub struct Authenticator {
    issuer: TokenIssuer,
    store: Arc<dyn UserStore>,
    mode: AuthMode,
}

impl Authenticator {
    /// Create an authenticator in `Required` mode
    pub fn new(issuer: TokenIssuer, store: Arc<dyn UserStore>) -> Self {
        Self {
            issuer,
            store,
            mode: AuthMode::Required,
        }
    }

    /// Same authenticator, different mode
    pub fn with_mode(&self, mode: AuthMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Extract the token from an `Authorization` header value
    ///
    /// Anything but `Bearer <non-empty token>` counts as no credential.
    pub fn bearer_token(header: Option<&str>) -> Option<&str> {
        header?
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Authenticate an `Authorization` header value
    pub async fn authenticate(&self, header: Option<&str>) -> Result<AuthSession, AuthError> {
        let token = Self::bearer_token(header).ok_or(Rejection::MissingCredential)?;

        let user_id = self.issuer.verify(token)?;

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(Rejection::UnknownUser)?;

        if !user.has_token(token) {
            return Err(Rejection::RevokedToken.into());
        }

        Ok(AuthSession {
            user: PublicUser::from(user),
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::test_config;
    use crate::store::testing::FaultyStore;
    use crate::store::{MemoryUserStore, TimeoutStore};

    use std::time::Duration;

    struct Fixture {
        store: Arc<FaultyStore>,
        issuer: TokenIssuer,
        auth: Authenticator,
        user_id: UserId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(FaultyStore::default());
        let issuer = TokenIssuer::new(&test_config());
        let auth = Authenticator::new(issuer.clone(), store.clone());
        let user_id = store.create_user("alice", "digest").await.unwrap().id;
        Fixture {
            store,
            issuer,
            auth,
            user_id,
        }
    }

    impl Fixture {
        async fn login(&self) -> String {
            let token = self.issuer.issue(self.user_id).unwrap();
            self.store.append_token(self.user_id, &token).await.unwrap();
            token
        }
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    fn rejection(result: Result<AuthSession, AuthError>) -> Option<Rejection> {
        result.unwrap_err().rejection()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(Authenticator::bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(Authenticator::bearer_token(Some("Bearer ")), None);
        assert_eq!(Authenticator::bearer_token(Some("Basic abc")), None);
        assert_eq!(Authenticator::bearer_token(Some("abc")), None);
        assert_eq!(Authenticator::bearer_token(None), None);
    }

    #[tokio::test]
    async fn test_authenticates_live_session() {
        let f = fixture().await;
        let token = f.login().await;

        let session = f.auth.authenticate(Some(&bearer(&token))).await.unwrap();
        assert_eq!(session.user_id(), f.user_id);
        assert_eq!(session.user.username, "alice");
        assert_eq!(session.token, token);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let f = fixture().await;
        assert_eq!(
            rejection(f.auth.authenticate(None).await),
            Some(Rejection::MissingCredential)
        );
        assert_eq!(
            rejection(f.auth.authenticate(Some("Token abc")).await),
            Some(Rejection::MissingCredential)
        );
    }

    #[tokio::test]
    async fn test_tampered_token_skips_store() {
        let f = fixture().await;
        let token = f.login().await;

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        let before = f.store.lookup_count();
        assert_eq!(
            rejection(f.auth.authenticate(Some(&bearer(&tampered))).await),
            Some(Rejection::InvalidToken)
        );
        assert_eq!(f.store.lookup_count(), before);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let f = fixture().await;
        let token = f.login().await;
        f.store.delete_user(f.user_id).await.unwrap();

        assert_eq!(
            rejection(f.auth.authenticate(Some(&bearer(&token))).await),
            Some(Rejection::UnknownUser)
        );
    }

    #[tokio::test]
    async fn test_revoked_after_clear_but_signature_still_valid() {
        let f = fixture().await;
        let first = f.login().await;
        let second = f.login().await;

        f.store.clear_tokens(f.user_id).await.unwrap();

        for token in [&first, &second] {
            assert_eq!(f.issuer.verify(token).unwrap(), f.user_id);
            assert_eq!(
                rejection(f.auth.authenticate(Some(&bearer(token))).await),
                Some(Rejection::RevokedToken)
            );
        }
    }

    #[tokio::test]
    async fn test_single_revocation_leaves_other_sessions() {
        let f = fixture().await;
        let phone = f.login().await;
        let laptop = f.login().await;

        f.store.remove_token(f.user_id, &phone).await.unwrap();

        assert!(f.auth.authenticate(Some(&bearer(&phone))).await.is_err());
        assert!(f.auth.authenticate(Some(&bearer(&laptop))).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_is_not_a_rejection() {
        let store = FaultyStore::default();
        let issuer = TokenIssuer::new(&test_config());
        let user_id = store.create_user("alice", "digest").await.unwrap().id;
        let token = issuer.issue(user_id).unwrap();
        store.append_token(user_id, &token).await.unwrap();
        store.hang_lookups();

        let bounded = TimeoutStore::new(store, Duration::from_millis(30));
        let auth = Authenticator::new(issuer, Arc::new(bounded));

        let err = auth.authenticate(Some(&bearer(&token))).await.unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
        assert_eq!(err.rejection(), None);
    }

    #[test]
    fn test_with_mode() {
        let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let auth = Authenticator::new(TokenIssuer::new(&test_config()), store);

        assert_eq!(auth.mode(), AuthMode::Required);
        assert_eq!(auth.with_mode(AuthMode::Optional).mode(), AuthMode::Optional);
    }
}

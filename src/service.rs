//! Authentication Service
//!
//! Account and session operations: registration, login, logout,
//! logout-all, profile changes and account deletion. Every user returned from
//! here is a [`PublicUser`].

use crate::authenticator::{AuthSession, Authenticator};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::*;
use crate::password::PasswordHasher;
use crate::registry::SessionRegistry;
use crate::store::UserStore;
use crate::token::TokenIssuer;

use std::sync::Arc;
use validator::Validate;

/// Authentication service
pub struct AuthService {
    store: Arc<dyn UserStore>,
    config: AuthConfig,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    registry: SessionRegistry,
    /// Verified against when a login names an unknown user, so that path
    /// costs the same as a wrong password
    dummy_hash: String,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(store: Arc<dyn UserStore>, config: AuthConfig) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new(&config)?;
        let dummy_hash = hasher.hash("rustpress-sessions-dummy-password")?;

        Ok(Self {
            issuer: TokenIssuer::new(&config),
            registry: SessionRegistry::new(store.clone()),
            store,
            config,
            hasher,
            dummy_hash,
        })
    }

    /// Get reference to config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Authenticator sharing this service's issuer and store
    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.issuer.clone(), self.store.clone())
    }

    /// Issue a token and record it as a new session
    async fn start_session(&self, user_id: UserId) -> Result<AuthResponse, AuthError> {
        let token = self.issuer.issue(user_id)?;
        let user = self.registry.add_token(user_id, &token).await?;

        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    // ============================================
    // Registration
    // ============================================

    /// Register a new user and open their first session
    ///
    /// If the first session cannot be recorded the new account is removed
    /// again, so a retry with the same username does not hit a conflict.
    pub async fn register(&self, req: CredentialsRequest) -> Result<AuthResponse, AuthError> {
        req.validate()?;

        let password_hash = self.hasher.hash_async(req.password).await?;
        let user = self.store.create_user(&req.username, &password_hash).await?;

        match self.start_session(user.id).await {
            Ok(response) => {
                tracing::info!(user_id = %user.id, "User registered");
                Ok(response)
            }
            Err(err) => {
                tracing::error!(user_id = %user.id, "First session failed, removing account: {}", err);
                if let Err(cleanup) = self.store.delete_user(user.id).await {
                    tracing::error!(user_id = %user.id, "Account cleanup failed: {}", cleanup);
                }
                Err(err)
            }
        }
    }

    // ============================================
    // Login / Logout
    // ============================================

    /// Verify credentials and open a new session
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, req: CredentialsRequest) -> Result<AuthResponse, AuthError> {
        req.validate()?;

        let user = match self.store.get_user_by_username(&req.username).await? {
            Some(user) => user,
            None => {
                self.hasher
                    .verify_async(req.password, self.dummy_hash.clone())
                    .await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .hasher
            .verify_async(req.password, user.password_hash.clone())
            .await
        {
            tracing::debug!(user_id = %user.id, "Login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user.id, sessions = user.session_count() + 1, "User logged in");

        self.start_session(user.id).await
    }

    /// End the session that made this request
    pub async fn logout(&self, session: &AuthSession) -> Result<PublicUser, AuthError> {
        let user = self
            .registry
            .remove_token(session.user_id(), &session.token)
            .await?;
        Ok(user.into())
    }

    /// End every session of the requesting user
    pub async fn logout_all(&self, session: &AuthSession) -> Result<PublicUser, AuthError> {
        let user = self.registry.clear_tokens(session.user_id()).await?;
        Ok(user.into())
    }

    // ============================================
    // Profile
    // ============================================

    /// Change username and/or password
    ///
    /// Existing sessions stay valid.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        req: UpdateProfileRequest,
    ) -> Result<PublicUser, AuthError> {
        req.validate()?;

        if req.is_empty() {
            return Err(AuthError::Validation(
                "Nothing to update: provide username or password".to_string(),
            ));
        }

        let password_hash = match req.password {
            Some(password) => Some(self.hasher.hash_async(password).await?),
            None => None,
        };

        let user = self
            .store
            .update_profile(user_id, req.username.as_deref(), password_hash.as_deref())
            .await?;

        tracing::info!(user_id = %user.id, "User profile updated");
        Ok(user.into())
    }

    /// Delete the account and with it every session
    pub async fn delete_account(&self, user_id: UserId) -> Result<PublicUser, AuthError> {
        let user = self.store.delete_user(user_id).await?;
        tracing::info!(user_id = %user.id, "User deleted");
        Ok(user.into())
    }

    // ============================================
    // Lookups
    // ============================================

    /// Get a user by ID
    pub async fn get_user(&self, user_id: UserId) -> Result<PublicUser, AuthError> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .map(PublicUser::from)
            .ok_or(AuthError::UserNotFound)
    }

    /// All users
    pub async fn list_users(&self) -> Result<Vec<PublicUser>, AuthError> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }
}

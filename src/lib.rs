//! RustPress Sessions
//!
//! Multi-session authentication core for RustPress providing:
//! - User registration and login
//! - Argon2id password hashing
//! - Signed session tokens, several live sessions per account
//! - Per-session logout and logout from all devices
//! - Required and optional authentication middleware
//!
//! A token is honoured only while its signature verifies *and* it is still
//! listed in the owner's session registry, so logout takes effect
//! immediately even for unexpired tokens.
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing tokens (required, min 32 chars)
//! - `JWT_EXPIRATION` - Token lifetime in seconds, `0` for none (default: 2592000)
//! - `JWT_ISSUER` - JWT issuer claim (default: "rustpress")
//! - `ARGON2_MEMORY_COST`, `ARGON2_TIME_COST`, `ARGON2_PARALLELISM` - hashing work factor
//! - `STORE_TIMEOUT_SECS` - Bound on each user store call, `0` for none (default: 10)
//!
//! # Usage
//!
//! ```rust,ignore
//! use rustpress_sessions::{create_routes, Plugin, SessionAuthPlugin};
//!
//! let plugin = SessionAuthPlugin::new();
//! plugin.activate(db_pool).await?;
//!
//! let app = create_routes(plugin.auth_service().await.unwrap());
//! ```

pub mod authenticator;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod registry;
pub mod service;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use authenticator::{AuthMode, AuthSession, Authenticator};
pub use config::AuthConfig;
pub use error::{AuthError, Rejection};
pub use extractors::{CurrentSession, MaybeSession};
pub use handlers::AuthState;
pub use models::*;
pub use password::PasswordHasher;
pub use registry::SessionRegistry;
pub use service::AuthService;
pub use store::{MemoryUserStore, PgUserStore, TimeoutStore, UserStore};
pub use token::TokenIssuer;

use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================
// Plugin Types
// ============================================

/// Plugin state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Inactive,
    Active,
    Error,
}

/// Plugin metadata
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Plugin lifecycle trait
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Get plugin information
    fn info(&self) -> &PluginInfo;

    /// Get current plugin state
    async fn state(&self) -> PluginState;

    /// Activate the plugin
    async fn activate(&self, db: PgPool) -> Result<(), AuthError>;

    /// Deactivate the plugin
    async fn deactivate(&self) -> Result<(), AuthError>;
}

// ============================================
// Session Auth Plugin Implementation
// ============================================

/// RustPress session authentication plugin
pub struct SessionAuthPlugin {
    info: PluginInfo,
    state: RwLock<PluginState>,
    config: RwLock<Option<AuthConfig>>,
    auth_service: RwLock<Option<Arc<AuthService>>>,
}

impl SessionAuthPlugin {
    /// Create a new plugin instance
    pub fn new() -> Self {
        Self {
            info: PluginInfo {
                id: "rustpress-sessions".into(),
                name: "RustPress Sessions".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                description: "Multi-session authentication for RustPress".into(),
            },
            state: RwLock::new(PluginState::Inactive),
            config: RwLock::new(None),
            auth_service: RwLock::new(None),
        }
    }

    /// Get the authentication configuration
    pub async fn config(&self) -> Option<AuthConfig> {
        self.config.read().await.clone()
    }

    /// Get the authentication service
    pub async fn auth_service(&self) -> Option<Arc<AuthService>> {
        self.auth_service.read().await.clone()
    }

    /// Wire the service over any store with an explicit config
    pub async fn activate_with(
        &self,
        store: Arc<dyn UserStore>,
        config: AuthConfig,
    ) -> Result<(), AuthError> {
        if let Err(e) = config.validate() {
            *self.state.write().await = PluginState::Error;
            return Err(e);
        }

        let auth_service = Arc::new(AuthService::new(store, config.clone())?);

        *self.config.write().await = Some(config);
        *self.auth_service.write().await = Some(auth_service);
        *self.state.write().await = PluginState::Active;

        Ok(())
    }
}

impl Default for SessionAuthPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for SessionAuthPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    async fn state(&self) -> PluginState {
        *self.state.read().await
    }

    async fn activate(&self, db: PgPool) -> Result<(), AuthError> {
        tracing::info!("Activating RustPress Sessions plugin");

        let config = match AuthConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                *self.state.write().await = PluginState::Error;
                return Err(e);
            }
        };

        let pg = PgUserStore::new(db);
        pg.run_migrations().await?;

        let store: Arc<dyn UserStore> = match config.store_timeout {
            Some(limit) => Arc::new(TimeoutStore::new(pg, limit)),
            None => Arc::new(pg),
        };

        self.activate_with(store, config).await?;

        tracing::info!("RustPress Sessions plugin activated successfully");
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), AuthError> {
        tracing::info!("Deactivating RustPress Sessions plugin");

        *self.auth_service.write().await = None;
        *self.config.write().await = None;
        *self.state.write().await = PluginState::Inactive;

        tracing::info!("RustPress Sessions plugin deactivated");
        Ok(())
    }
}

/// Create user and session routes
///
/// Call this after activating the plugin to get the router with all endpoints.
pub fn create_routes(auth_service: Arc<AuthService>) -> Router {
    handlers::create_routes(auth_service)
}

// ============================================
// Module Tests
// ============================================

//! Authentication Configuration
//!
//! All configuration values are loaded from environment variables.
//! The signing secret is injected into the token issuer at construction and
//! is redacted from `Debug` output.

use crate::error::AuthError;
use std::env;
use std::fmt;
use std::time::Duration;

/// Authentication configuration loaded from environment
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing session tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Session token lifetime in seconds, `None` for non-expiring tokens
    /// (from JWT_EXPIRATION env var, `0` disables expiry)
    pub token_expiration: Option<i64>,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Upper bound for a single user store call, `None` for unbounded
    /// (from STORE_TIMEOUT_SECS env var, `0` disables the bound)
    pub store_timeout: Option<Duration>,
}

const DEFAULT_TOKEN_EXPIRATION: i64 = 2_592_000; // 30 days
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AuthError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AuthError::Config(format!("{name} is not a valid number"))),
        Err(_) => Ok(default),
    }
}

impl AuthConfig {
    /// Configuration with the given secret and default settings
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_expiration: Some(DEFAULT_TOKEN_EXPIRATION),
            jwt_issuer: "rustpress".to_string(),
            argon2_memory_cost: 19456,
            argon2_time_cost: 2,
            argon2_parallelism: 1,
            store_timeout: Some(Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS)),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Fails if `JWT_SECRET` is unset or a numeric variable does not parse.
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            AuthError::Config("JWT_SECRET environment variable must be set".to_string())
        })?;

        let defaults = Self::new(jwt_secret);

        let token_expiration = match parsed("JWT_EXPIRATION", DEFAULT_TOKEN_EXPIRATION)? {
            0 => None,
            secs => Some(secs),
        };

        let store_timeout = match parsed("STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            token_expiration,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt_issuer.clone()),
            argon2_memory_cost: parsed("ARGON2_MEMORY_COST", defaults.argon2_memory_cost)?,
            argon2_time_cost: parsed("ARGON2_TIME_COST", defaults.argon2_time_cost)?,
            argon2_parallelism: parsed("ARGON2_PARALLELISM", defaults.argon2_parallelism)?,
            store_timeout,
            ..defaults
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if matches!(self.token_expiration, Some(secs) if secs < 0) {
            return Err(AuthError::Config(
                "JWT_EXPIRATION must not be negative".to_string(),
            ));
        }

        if self.jwt_issuer.is_empty() {
            return Err(AuthError::Config("JWT_ISSUER must not be empty".to_string()));
        }

        if argon2::Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            None,
        )
        .is_err()
        {
            return Err(AuthError::Config(
                "ARGON2_* settings are outside the supported range".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_expiration", &self.token_expiration)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("argon2_memory_cost", &self.argon2_memory_cost)
            .field("argon2_time_cost", &self.argon2_time_cost)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

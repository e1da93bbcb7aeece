//! Session Token Issuer
//!
//! Signed, stateless session tokens. A token that verifies here is only
//! *well-formed*; whether it is still a live session is decided by the
//! [`SessionRegistry`](crate::registry::SessionRegistry).

use crate::config::AuthConfig;
use crate::error::{AuthError, Rejection};
use crate::models::{SessionClaims, UserId};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// Issues and verifies HS256 session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiration: Option<i64>,
}

impl TokenIssuer {
    /// Create an issuer holding the signing secret from `config`
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            expiration: config.token_expiration,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;

        if self.expiration.is_none() {
            validation.validate_exp = false;
            validation.required_spec_claims.remove("exp");
        }

        validation
    }

    /// Issue a new session token for a user
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();

        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: self
                .expiration
                .map(|secs| (now + Duration::seconds(secs)).timestamp()),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify signature, issuer and expiry, returning the claims
    pub fn verify_claims(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation())?;
        Ok(token_data.claims)
    }

    /// Verify a token and return the user it was issued to
    ///
    /// Every malformed, tampered or expired token yields
    /// `Unauthorized(InvalidToken)`.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        self.verify_claims(token)?
            .user_id()
            .ok_or(AuthError::Unauthorized(Rejection::InvalidToken))
    }
}

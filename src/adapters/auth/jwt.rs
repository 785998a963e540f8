//! HS256 JWT adapter for the admission handshake.
//!
//! This adapter implements the `SessionValidator` port against the
//! platform's shared-secret token scheme. It validates tokens by:
//!
//! 1. Verifying the HS256 signature against the shared signing key
//! 2. Verifying the expiry (`exp`) claim
//! 3. Extracting the `userID` and `role` claims
//! 4. Mapping claims to the domain `AuthenticatedUser` type
//!
//! The same key signs tokens in the CRUD collaborator, so a login token
//! works unchanged for the live connection endpoint.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, UserId};
use crate::ports::SessionValidator;

/// Claims the hub reads from a verified token.
///
/// `userID` is required; `role` is optional and defaults to customer,
/// matching how the identity collaborator issues tokens.
#[derive(Debug, Deserialize)]
struct HubClaims {
    #[serde(rename = "userID")]
    user_id: Option<i64>,
    role: Option<String>,
}

/// Session validator backed by the shared HS256 signing key.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    /// Creates a validator from raw secret bytes.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Creates a validator from the auth configuration section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.secret_bytes())
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<HubClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, "token rejected");
                    AuthError::InvalidToken
                }
            })?;

        let user_id = data
            .claims
            .user_id
            .ok_or_else(|| AuthError::malformed_claims("missing userID claim"))?;
        let role = Role::from_claim(data.claims.role.as_deref());

        Ok(AuthenticatedUser::new(UserId::new(user_id), role))
    }
}

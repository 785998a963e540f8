//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum secret length accepted in production. HS256 with a short secret
/// is brute-forceable offline.
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Authentication configuration (shared HS256 signing key)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to verify token signatures. The same key signs
    /// tokens in the CRUD collaborator.
    pub jwt_secret: SecretString,
}

impl AuthConfig {
    /// Returns the raw secret bytes for the token decoder.
    pub fn secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }

    /// Validate authentication configuration
    ///
    /// In production, requires a secret long enough to resist offline
    /// brute force. In development, any non-empty secret is accepted.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::new(secret.to_string()),
        }
    }

    #[test]
    fn test_validation_missing_secret() {
        assert!(config("").validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_short_secret_allowed_in_development() {
        assert!(config("dev-secret").validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_short_secret_rejected_in_production() {
        assert!(config("dev-secret").validate(&Environment::Production).is_err());
    }

    #[test]
    fn test_long_secret_accepted_in_production() {
        let secret = "a".repeat(MIN_PRODUCTION_SECRET_LEN);
        assert!(config(&secret).validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_secret_bytes_exposes_raw_key() {
        assert_eq!(config("topsecret").secret_bytes(), b"topsecret");
    }
}

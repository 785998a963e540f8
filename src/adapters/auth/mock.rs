//! Mock authentication adapter for testing.
//!
//! Implements the `SessionValidator` port as a token map, avoiding the
//! need to mint real JWTs in connection and routing tests.
//!
//! # Example
//!
//! ```ignore
//! use delivery_hub::adapters::auth::MockSessionValidator;
//! use delivery_hub::domain::foundation::{AuthenticatedUser, Role, UserId};
//!
//! let validator = MockSessionValidator::new()
//!     .with_user("valid-token", AuthenticatedUser::new(UserId::new(1), Role::Customer));
//!
//! let result = validator.validate("valid-token").await;
//! assert!(result.is_ok());
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Mock session validator for testing.
///
/// Stores a map of tokens to users. Tokens not in the map return
/// `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    /// Map of valid tokens to their associated users
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Optional error to return for all validations (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    /// Creates a new empty mock validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token/user pair the validator will accept.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.tokens
            .write()
            .expect("MockSessionValidator: tokens lock poisoned")
            .insert(token.into(), user);
        self
    }

    /// Forces every validation to fail with the given error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .expect("MockSessionValidator: error lock poisoned") = Some(error);
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(err) = self
            .force_error
            .read()
            .expect("MockSessionValidator: error lock poisoned")
            .clone()
        {
            return Err(err);
        }

        self.tokens
            .read()
            .expect("MockSessionValidator: tokens lock poisoned")
            .get(token)
            .copied()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Role, UserId};

    #[tokio::test]
    async fn validates_known_token() {
        let validator = MockSessionValidator::new()
            .with_user("tok", AuthenticatedUser::new(UserId::new(5), Role::Admin));

        let user = validator.validate("tok").await.unwrap();
        assert_eq!(user.id, UserId::new(5));
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn rejects_unknown_token() {
        let validator = MockSessionValidator::new();
        assert!(matches!(
            validator.validate("nope").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn forced_error_overrides_token_map() {
        let validator = MockSessionValidator::new()
            .with_user("tok", AuthenticatedUser::new(UserId::new(5), Role::Customer))
            .with_error(AuthError::TokenExpired);

        assert!(matches!(
            validator.validate("tok").await,
            Err(AuthError::TokenExpired)
        ));
    }
}

//! Authentication types for the domain layer.
//!
//! These types represent an authenticated user extracted from a JWT token.
//! They have **no provider dependencies** - the `SessionValidator` port
//! populates them from whatever token scheme the identity collaborator uses.
//!
//! # Design Decisions
//!
//! - `AuthenticatedUser` carries only the claims the hub actually uses:
//!   the user id and the platform role.
//! - `AuthError` is domain-centric, not library-specific.
//! - Types are `Clone` + `Copy`-friendly for use in connection tasks.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::UserId;

/// Platform role carried in the token's `role` claim.
///
/// Roles drive authorization decisions made elsewhere in the system; the
/// hub only records them for logging and future policy hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Shipper,
    Admin,
}

impl Role {
    /// Parses a role claim, falling back to `Customer` for unknown values.
    ///
    /// The identity collaborator treats the role claim as optional, so an
    /// absent or unrecognized value is not an admission failure.
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim {
            Some("shipper") => Role::Shipper,
            Some("admin") => Role::Admin,
            _ => Role::Customer,
        }
    }

    /// Returns the wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Shipper => "shipper",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticated user extracted from a validated JWT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the `userID` claim.
    pub id: UserId,

    /// The platform role from the `role` claim.
    pub role: Role,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    ///
    /// This is typically called by the `SessionValidator` adapter after
    /// successfully validating a token.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Authentication errors that can occur during admission.
///
/// Any of these refuses the WebSocket upgrade before a connection or
/// registry entry is created.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No token was presented at upgrade time.
    #[error("Missing authentication token")]
    MissingToken,

    /// The token is malformed or its signature does not verify.
    #[error("Invalid token")]
    InvalidToken,

    /// The token's expiry claim is in the past.
    #[error("Token expired")]
    TokenExpired,

    /// The token verified but lacks a usable `userID` claim.
    #[error("Invalid token payload: {0}")]
    MalformedClaims(String),
}

impl AuthError {
    /// Creates a malformed-claims error with a reason.
    pub fn malformed_claims(reason: impl Into<String>) -> Self {
        Self::MalformedClaims(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_from_claim_maps_known_values() {
        assert_eq!(Role::from_claim(Some("customer")), Role::Customer);
        assert_eq!(Role::from_claim(Some("shipper")), Role::Shipper);
        assert_eq!(Role::from_claim(Some("admin")), Role::Admin);
    }

    #[test]
    fn role_from_claim_defaults_to_customer() {
        assert_eq!(Role::from_claim(None), Role::Customer);
        assert_eq!(Role::from_claim(Some("superuser")), Role::Customer);
    }

    #[test]
    fn role_display_matches_wire_form() {
        assert_eq!(Role::Shipper.to_string(), "shipper");
        assert_eq!(Role::Customer.to_string(), "customer");
    }

    #[test]
    fn authenticated_user_carries_identity() {
        let user = AuthenticatedUser::new(UserId::new(5), Role::Shipper);
        assert_eq!(user.id, UserId::new(5));
        assert_eq!(user.role, Role::Shipper);
    }

    #[test]
    fn auth_error_displays_reason() {
        let err = AuthError::malformed_claims("missing userID");
        assert_eq!(format!("{}", err), "Invalid token payload: missing userID");
        assert_eq!(format!("{}", AuthError::TokenExpired), "Token expired");
    }
}

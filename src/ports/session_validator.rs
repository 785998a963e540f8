//! SessionValidator port - admission handshake for live connections.
//!
//! The hub never parses tokens itself; it hands the raw bearer token to an
//! implementation of this port and receives either a verified identity or a
//! terminal refusal. No connection or registry entry exists until the
//! validator has succeeded.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Port for validating bearer tokens presented at connection-upgrade time.
///
/// Implementations verify signature and expiry against the platform's
/// signing key and extract the `userID` and `role` claims. The production
/// adapter uses HS256 JWTs; tests use a token-map mock.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validates a token and returns the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] for a missing, malformed, expired, or
    /// otherwise unverifiable token. Callers must refuse the upgrade on
    /// any error - partial registration never occurs.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

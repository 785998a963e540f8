//! Foundation types shared across the domain.

mod auth;
mod ids;

pub use auth::{AuthError, AuthenticatedUser, Role};
pub use ids::{ConnectionId, OrderId, UserId};

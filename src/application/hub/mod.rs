//! The real-time connection hub.
//!
//! Admits authenticated long-lived connections, tracks which user owns
//! which live connection, and routes frames between users without blocking
//! the rest of the system. See the `registry` module for the concurrency
//! model and the `router` module for classification policy.

mod connection;
mod registry;
mod router;

pub use connection::{Client, DeliveryFailure, OutboundFrame};
pub use registry::{Hub, HubHandle};
pub use router::{classify, RouteDecision, Router};

//! Message router: classifies inbound frames and dispatches them.
//!
//! Colocated with the registry as pure policy: the router decides *where*
//! a frame goes, the registry decides *whether* it can be delivered.
//!
//! Provenance is enforced here: every routed frame has `from_user_id`
//! overwritten with the sending connection's admission-time identity, so a
//! client-supplied sender field can never survive to a recipient.

use crate::domain::foundation::UserId;
use crate::domain::messaging::{Frame, MessageKind};

use super::registry::HubHandle;

/// Outcome of classifying one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Deliver directly to one recipient.
    Direct(UserId),
    /// Fan out to everyone except the sender.
    Fanout,
    /// Self-addressed direct frame; dropped silently.
    DropSelfAddressed,
    /// Direct-style frame with no recipient; undeliverable.
    DropNoRecipient,
}

/// Classifies a frame by its `type` tag and recipient field.
///
/// A `chat_message`, or any frame carrying `to_user_id`, is a direct
/// message. Everything else (including tags this build does not recognize)
/// falls through to broadcast - the platform's long-standing default,
/// kept deliberately so new client message kinds degrade to fan-out
/// instead of being rejected.
pub fn classify(sender: UserId, frame: &Frame) -> RouteDecision {
    let is_direct = frame.kind() == MessageKind::Chat || frame.to_user_id.is_some();
    if !is_direct {
        return RouteDecision::Fanout;
    }
    match frame.to_user_id {
        Some(to) if to == sender => RouteDecision::DropSelfAddressed,
        Some(to) => RouteDecision::Direct(to),
        None => RouteDecision::DropNoRecipient,
    }
}

/// Routes decoded frames from a connection's read pump into the registry.
#[derive(Debug, Clone)]
pub struct Router {
    hub: HubHandle,
}

impl Router {
    /// Creates a router over a registry handle.
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }

    /// Stamps provenance and dispatches one inbound frame.
    ///
    /// Never fails from the caller's point of view: undeliverable frames
    /// are dropped with a log line, matching best-effort semantics.
    pub fn route(&self, sender: UserId, mut frame: Frame) {
        frame.stamp_sender(sender);

        let decision = classify(sender, &frame);
        let serialized = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(sender = %sender, error = %e, "frame serialization failed");
                return;
            }
        };

        match decision {
            RouteDecision::Direct(to) => {
                tracing::debug!(sender = %sender, to = %to, kind = %frame.kind, "direct route");
                self.hub.send_to_user(to, serialized);
            }
            RouteDecision::Fanout => {
                tracing::debug!(sender = %sender, kind = %frame.kind, "broadcast route");
                self.hub.broadcast(serialized, Some(sender));
            }
            RouteDecision::DropSelfAddressed => {
                tracing::debug!(sender = %sender, "self-addressed frame dropped");
            }
            RouteDecision::DropNoRecipient => {
                tracing::warn!(sender = %sender, "chat frame without recipient dropped");
            }
        }
    }
}

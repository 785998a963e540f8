//! Wire message types exchanged over live connections.
//!
//! One JSON object per text frame. The schema is shared with the CRUD
//! collaborator so field names follow the platform's existing wire form:
//!
//! ```text
//! { "type": "chat_message", "order_id": 12, "to_user_id": 5,
//!   "content": "on my way", "created_at": "2026-08-29T10:00:00Z" }
//! ```
//!
//! `from_user_id` is **server-stamped**: whatever a client supplies is
//! discarded and replaced with the sender's admission-time identity before
//! the frame is routed anywhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::foundation::{OrderId, UserId};

/// Message type tag for a direct chat message between two users.
pub const CHAT_MESSAGE: &str = "chat_message";

/// Message type tag for a courier location update.
pub const LOCATION_UPDATE: &str = "location_update";

// ════════════════════════════════════════════════════════════════════════════════
// Wire Frame
// ════════════════════════════════════════════════════════════════════════════════

/// A single inbound or outbound message frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Message type discriminator (see [`MessageKind`]).
    #[serde(rename = "type")]
    pub kind: String,

    /// The delivery order this message belongs to.
    pub order_id: OrderId,

    /// Recipient for direct messages; absent for broadcast kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user_id: Option<UserId>,

    /// Sender identity, stamped by the server. A client-supplied value is
    /// overwritten during routing and never trusted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_user_id: Option<UserId>,

    /// Free-form message content.
    #[serde(default)]
    pub content: String,

    /// Latitude for location-style updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude for location-style updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Client-side creation timestamp, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Frame {
    /// Classifies the frame by its `type` tag.
    pub fn kind(&self) -> MessageKind {
        MessageKind::from_tag(&self.kind)
    }

    /// Overwrites the sender field with the verified identity.
    ///
    /// Called exactly once per inbound frame, before any delivery attempt.
    pub fn stamp_sender(&mut self, sender: UserId) {
        self.from_user_id = Some(sender);
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Message Kinds
// ════════════════════════════════════════════════════════════════════════════════

/// Closed classification of the wire `type` tag.
///
/// The tag set is open on the wire, so unrecognized values map to
/// [`MessageKind::Other`]. Routing falls back to broadcast for that arm;
/// see the router for the rationale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Direct chat between two participants of an order.
    Chat,
    /// Courier position update fanned out to interested parties.
    LocationUpdate,
    /// Any tag this build does not recognize.
    Other(String),
}

impl MessageKind {
    /// Maps a raw tag to its classification.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            CHAT_MESSAGE => MessageKind::Chat,
            LOCATION_UPDATE => MessageKind::LocationUpdate,
            other => MessageKind::Other(other.to_string()),
        }
    }
}

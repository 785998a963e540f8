//! MessageLog port - durable chat history collaborator.
//!
//! The hub itself is memory-only: registrations and in-flight frames do not
//! survive a restart. Chat history that must survive is written through this
//! port by the code that owns request handling (the WebSocket adapter),
//! never by the registry or router.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{OrderId, UserId};

/// A chat message to be appended to durable history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    /// Order the conversation belongs to.
    pub order_id: OrderId,
    /// Verified sender identity.
    pub from_user_id: UserId,
    /// Recipient identity.
    pub to_user_id: UserId,
    /// Message body.
    pub content: String,
}

/// Errors from the durable message log.
#[derive(Debug, Error)]
pub enum MessageLogError {
    /// The underlying store rejected or failed the write.
    #[error("Message store error: {0}")]
    Store(String),
}

impl MessageLogError {
    /// Creates a store error with a message.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

/// Port for appending chat messages to durable history.
///
/// Writes are best-effort from the hub's point of view: a failed append is
/// logged and the frame is still routed, matching the delivery semantics of
/// the rest of the component.
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Appends one chat message to history.
    async fn record(&self, message: NewChatMessage) -> Result<(), MessageLogError>;
}

//! Ports: async trait seams between the hub and its collaborators.

mod message_log;
mod session_validator;

pub use message_log::{MessageLog, MessageLogError, NewChatMessage};
pub use session_validator::SessionValidator;

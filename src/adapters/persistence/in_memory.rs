//! In-memory message log for testing.
//!
//! Captures appended messages for assertions instead of writing to
//! PostgreSQL. Test-only; production uses `PostgresMessageLog`.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{MessageLog, MessageLogError, NewChatMessage};

/// In-memory message log that records every append.
///
/// # Panics
///
/// Methods may panic if the internal lock is poisoned. Acceptable for test
/// code; this adapter is not used in production.
#[derive(Debug, Default)]
pub struct InMemoryMessageLog {
    recorded: Mutex<Vec<NewChatMessage>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryMessageLog {
    /// Creates a new empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent append fail (for error-path testing).
    pub fn failing(self) -> Self {
        *self
            .fail_writes
            .lock()
            .expect("InMemoryMessageLog: flag lock poisoned") = true;
        self
    }

    /// Returns all recorded messages (for test assertions).
    pub fn recorded(&self) -> Vec<NewChatMessage> {
        self.recorded
            .lock()
            .expect("InMemoryMessageLog: lock poisoned")
            .clone()
    }

    /// Returns count of recorded messages.
    pub fn count(&self) -> usize {
        self.recorded
            .lock()
            .expect("InMemoryMessageLog: lock poisoned")
            .len()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn record(&self, message: NewChatMessage) -> Result<(), MessageLogError> {
        if *self
            .fail_writes
            .lock()
            .expect("InMemoryMessageLog: flag lock poisoned")
        {
            return Err(MessageLogError::store("forced failure"));
        }
        self.recorded
            .lock()
            .expect("InMemoryMessageLog: lock poisoned")
            .push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{OrderId, UserId};

    fn message(content: &str) -> NewChatMessage {
        NewChatMessage {
            order_id: OrderId::new(1),
            from_user_id: UserId::new(1),
            to_user_id: UserId::new(2),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn records_appends_in_order() {
        let log = InMemoryMessageLog::new();

        log.record(message("first")).await.unwrap();
        log.record(message("second")).await.unwrap();

        let recorded = log.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].content, "first");
        assert_eq!(recorded[1].content, "second");
    }

    #[tokio::test]
    async fn failing_log_returns_store_error() {
        let log = InMemoryMessageLog::new().failing();

        let result = log.record(message("dropped")).await;
        assert!(matches!(result, Err(MessageLogError::Store(_))));
        assert_eq!(log.count(), 0);
    }
}

//! PostgreSQL adapter for the `MessageLog` port.
//!
//! Appends chat messages to the platform's `messages` table so history
//! endpoints served by the CRUD collaborator can read them back. The pool
//! is lazy: the hub starts and routes traffic even if the database is
//! temporarily unreachable, and failed appends surface as log lines only.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::ports::{MessageLog, MessageLogError, NewChatMessage};

/// Message log backed by the shared PostgreSQL database.
#[derive(Debug, Clone)]
pub struct PostgresMessageLog {
    pool: PgPool,
}

impl PostgresMessageLog {
    /// Creates a message log over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageLog for PostgresMessageLog {
    async fn record(&self, message: NewChatMessage) -> Result<(), MessageLogError> {
        sqlx::query(
            "INSERT INTO messages (order_id, sender_id, receiver_id, content, is_read) \
             VALUES ($1, $2, $3, $4, FALSE)",
        )
        .bind(message.order_id.as_i64())
        .bind(message.from_user_id.as_i64())
        .bind(message.to_user_id.as_i64())
        .bind(&message.content)
        .execute(&self.pool)
        .await
        .map_err(|e| MessageLogError::store(e.to_string()))?;

        Ok(())
    }
}

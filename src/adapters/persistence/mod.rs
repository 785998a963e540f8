//! Persistence adapters implementing the `MessageLog` port.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryMessageLog;
pub use postgres::PostgresMessageLog;

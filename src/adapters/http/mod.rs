//! HTTP adapters: route assembly and the WebSocket endpoint.

mod routes;
mod ws;

pub use routes::app;
pub use ws::{ws_handler, WsConnectParams};

use std::sync::Arc;

use crate::application::hub::HubHandle;
use crate::config::HubConfig;
use crate::ports::{MessageLog, SessionValidator};

/// Shared state for the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the registry coordinator.
    pub hub: HubHandle,
    /// Admission handshake implementation.
    pub validator: Arc<dyn SessionValidator>,
    /// Durable chat history collaborator.
    pub message_log: Arc<dyn MessageLog>,
    /// Queue and heartbeat tuning.
    pub hub_config: HubConfig,
}

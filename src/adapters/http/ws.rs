//! WebSocket handler for the live connection endpoint.
//!
//! # Connection Flow
//! 1. Client requests upgrade on `GET /api/v1/ws?token=<jwt>`
//! 2. Server validates the token via the `SessionValidator` port
//! 3. On failure, responds 401 with no upgrade and no resources allocated
//! 4. On success, upgrades and registers the connection with the hub
//! 5. Two pumps run until teardown: the read pump feeds the router, the
//!    write pump drains the outbound queue onto the transport
//! 6. Any read/write error, close frame, idle deadline, or queue close
//!    tears the connection down; both pumps finish before resources are
//!    considered released
//!
//! Chat frames are appended to durable history here, in the adapter that
//! owns request handling - never inside the registry or router.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::application::hub::{classify, Client, HubHandle, OutboundFrame, RouteDecision, Router};
use crate::domain::foundation::{AuthError, AuthenticatedUser, ConnectionId, UserId};
use crate::domain::messaging::{Frame, MessageKind};
use crate::ports::{NewChatMessage, SessionValidator};

use super::AppState;

/// Query parameters for the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsConnectParams {
    /// Bearer token for user authentication.
    pub token: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Upgrade Handler
// ════════════════════════════════════════════════════════════════════════════════

/// Handles the WebSocket upgrade for the live connection endpoint.
///
/// Admission runs before the upgrade: a refused token gets a plain 401
/// response and nothing - no connection, no registry entry - is created.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsConnectParams>,
    State(state): State<AppState>,
) -> Response {
    let user = match admit(state.validator.as_ref(), params.token.as_deref()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, "websocket admission refused");
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, user, state))
}

/// Runs the admission handshake against the presented token.
async fn admit(
    validator: &dyn SessionValidator,
    token: Option<&str>,
) -> Result<AuthenticatedUser, AuthError> {
    match token {
        Some(token) => validator.validate(token).await,
        None => Err(AuthError::MissingToken),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Connection Lifecycle
// ════════════════════════════════════════════════════════════════════════════════

/// Drives one established connection from registration to full teardown.
async fn handle_socket(socket: WebSocket, user: AuthenticatedUser, state: AppState) {
    let conn_id = ConnectionId::new();
    let (outbound_tx, outbound_rx) = mpsc::channel(state.hub_config.outbound_queue_capacity);

    state.hub.register(Client::new(user.id, conn_id, outbound_tx));
    tracing::info!(
        user_id = %user.id,
        conn_id = %conn_id,
        role = %user.role,
        "websocket connected"
    );

    let (sink, stream) = socket.split();
    let write_task = tokio::spawn(write_pump(
        sink,
        outbound_rx,
        state.hub.clone(),
        user.id,
        conn_id,
        state.hub_config.ping_interval(),
    ));

    read_pump(stream, &user, conn_id, &state).await;

    // Idempotent: the registry ignores this if a newer registration for the
    // same user already superseded us.
    state.hub.unregister(user.id, conn_id);

    // Unregister drops the queue sender, which terminates the write pump;
    // wait for it so queue and transport are fully released.
    let _ = write_task.await;

    tracing::info!(user_id = %user.id, conn_id = %conn_id, "websocket closed");
}

/// Consumes the outbound queue in FIFO order and writes to the transport.
///
/// Terminates when the queue is closed by the registry (unregister or
/// eviction) or on the first write error, then closes the transport
/// exactly once. Sends a protocol ping on the configured interval so dead
/// peers are detected by the read pump's idle deadline.
async fn write_pump(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<OutboundFrame>,
    hub: HubHandle,
    user_id: UserId,
    conn_id: ConnectionId,
    ping_interval: Duration,
) {
    let mut ping = tokio::time::interval(ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; consume it so the first real
    // ping goes out one full interval after connect.
    ping.tick().await;

    loop {
        tokio::select! {
            maybe_frame = outbound_rx.recv() => match maybe_frame {
                Some(frame) => {
                    if let Err(e) = sink.send(Message::Text(frame)).await {
                        tracing::debug!(user_id = %user_id, error = %e, "websocket write error");
                        hub.unregister(user_id, conn_id);
                        break;
                    }
                }
                // Queue closed by the registry: the owning close signal.
                None => break,
            },
            _ = ping.tick() => {
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    hub.unregister(user_id, conn_id);
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;
}

/// Awaits inbound frames under the idle deadline and feeds the router.
///
/// Any read error, close frame, or deadline expiry ends the loop; the
/// caller then unregisters. Inbound pings are answered by the framework;
/// pongs (and any other traffic) reset the idle deadline.
async fn read_pump(
    mut stream: SplitStream<WebSocket>,
    user: &AuthenticatedUser,
    conn_id: ConnectionId,
    state: &AppState,
) {
    let router = Router::new(state.hub.clone());
    let idle_timeout = state.hub_config.idle_timeout();

    loop {
        match tokio::time::timeout(idle_timeout, stream.next()).await {
            Err(_) => {
                tracing::info!(user_id = %user.id, conn_id = %conn_id, "idle deadline expired");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::debug!(user_id = %user.id, error = %e, "websocket read error");
                break;
            }
            Ok(Some(Ok(Message::Text(text)))) => match serde_json::from_str::<Frame>(&text) {
                Ok(frame) => handle_inbound(user.id, frame, &router, state).await,
                Err(e) => {
                    tracing::warn!(user_id = %user.id, error = %e, "undecodable frame ignored");
                }
            },
            Ok(Some(Ok(Message::Close(_)))) => {
                tracing::debug!(user_id = %user.id, conn_id = %conn_id, "client closed connection");
                break;
            }
            Ok(Some(Ok(_))) => {} // Ping/Pong/Binary: liveness only
        }
    }
}

/// Persists chat history (best-effort) and hands the frame to the router.
async fn handle_inbound(sender: UserId, frame: Frame, router: &Router, state: &AppState) {
    if frame.kind() == MessageKind::Chat {
        if let RouteDecision::Direct(to) = classify(sender, &frame) {
            let entry = NewChatMessage {
                order_id: frame.order_id,
                from_user_id: sender,
                to_user_id: to,
                content: frame.content.clone(),
            };
            if let Err(e) = state.message_log.record(entry).await {
                tracing::warn!(user_id = %sender, error = %e, "chat history write failed");
            }
        }
    }

    router.route(sender, frame);
}

//! Per-connection types shared between the registry and the transport pumps.

use tokio::sync::mpsc;

use crate::domain::foundation::{ConnectionId, UserId};

/// A serialized outbound frame, ready to write to the transport.
///
/// Frames are serialized once (before enqueue) so a broadcast pays the
/// serialization cost a single time, not once per recipient.
pub type OutboundFrame = String;

/// Reason a non-blocking enqueue onto an outbound queue failed.
///
/// Either way the registry treats the connection as dead and evicts it;
/// the distinction only matters for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The bounded queue was full (slow consumer).
    QueueFull,
    /// The write pump already terminated and dropped the receiver.
    QueueClosed,
}

/// Registry-side handle to one live connection.
///
/// Holds the sending half of the connection's bounded outbound queue. The
/// write pump owns the receiving half; dropping this handle is the sole
/// close signal that terminates the pump.
#[derive(Debug, Clone)]
pub struct Client {
    /// The authenticated user this connection is bound to.
    pub user_id: UserId,

    /// Fresh per-registration id, used to reject stale unregisters.
    pub conn_id: ConnectionId,

    outbound: mpsc::Sender<OutboundFrame>,
}

impl Client {
    /// Creates a registry handle from the sending half of an outbound queue.
    pub fn new(
        user_id: UserId,
        conn_id: ConnectionId,
        outbound: mpsc::Sender<OutboundFrame>,
    ) -> Self {
        Self {
            user_id,
            conn_id,
            outbound,
        }
    }

    /// Attempts a non-blocking enqueue of one frame.
    ///
    /// Never suspends: the coordinator must not be stalled by one slow or
    /// dead client.
    pub fn try_deliver(&self, frame: OutboundFrame) -> Result<(), DeliveryFailure> {
        self.outbound.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryFailure::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryFailure::QueueClosed,
        })
    }
}

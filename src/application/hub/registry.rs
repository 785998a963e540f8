//! The connection registry: one coordinating task owning the table of live
//! connections.
//!
//! All table mutation happens on a single task consuming three control
//! conduits (admission, removal, routing), which gives a total order over
//! register/unregister/route events without any locking. That ordering is
//! what rules out the send-after-close and double-delete races a shared
//! concurrent map would invite.
//!
//! Delivery is best-effort throughout: an absent recipient is a no-op, and
//! a recipient whose outbound queue is full is evicted rather than awaited.
//!
//! # Lifecycle
//!
//! ```text
//! Hub::new() ──► (Hub, HubHandle)
//!     │                 │
//! hub.run()      handle.register / unregister / send_to_user / broadcast
//! (forever)             │
//!     ◄─────────────────┘  (unbounded control channels)
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::connection::{Client, OutboundFrame};
use crate::domain::foundation::{ConnectionId, UserId};

/// Request to remove one specific connection from the table.
#[derive(Debug)]
struct Unregister {
    user_id: UserId,
    conn_id: ConnectionId,
}

/// Delivery work consumed by the coordinator's fan-out conduit.
#[derive(Debug)]
enum RouteCommand {
    /// Deliver one frame to one user, if registered.
    Direct { to: UserId, frame: OutboundFrame },
    /// Deliver one frame to every registered user except `exclude`.
    Broadcast {
        frame: OutboundFrame,
        exclude: Option<UserId>,
    },
}

/// Cloneable handle for talking to the coordinator.
///
/// All methods are synchronous and non-blocking: they enqueue onto
/// unbounded control channels, so callers (request handlers, pumps, the
/// router) are never stalled by registry work.
#[derive(Debug, Clone)]
pub struct HubHandle {
    register_tx: mpsc::UnboundedSender<Client>,
    unregister_tx: mpsc::UnboundedSender<Unregister>,
    route_tx: mpsc::UnboundedSender<RouteCommand>,
    online: Arc<AtomicUsize>,
}

impl HubHandle {
    /// Registers a connection, superseding any prior entry for the user.
    pub fn register(&self, client: Client) {
        if self.register_tx.send(client).is_err() {
            tracing::debug!("hub coordinator stopped; register dropped");
        }
    }

    /// Unregisters a connection.
    ///
    /// Idempotent, and safe to call from either pump: the coordinator only
    /// removes the entry if it still holds this exact `conn_id`, so an
    /// unregister from a superseded connection never deletes its successor.
    pub fn unregister(&self, user_id: UserId, conn_id: ConnectionId) {
        let req = Unregister { user_id, conn_id };
        if self.unregister_tx.send(req).is_err() {
            tracing::debug!("hub coordinator stopped; unregister dropped");
        }
    }

    /// Sends one serialized frame to one user.
    ///
    /// An offline recipient is not an error; the frame is silently dropped.
    pub fn send_to_user(&self, to: UserId, frame: OutboundFrame) {
        let cmd = RouteCommand::Direct { to, frame };
        if self.route_tx.send(cmd).is_err() {
            tracing::debug!("hub coordinator stopped; direct send dropped");
        }
    }

    /// Fans one serialized frame out to every registered user except
    /// `exclude` (normally the sender).
    pub fn broadcast(&self, frame: OutboundFrame, exclude: Option<UserId>) {
        let cmd = RouteCommand::Broadcast { frame, exclude };
        if self.route_tx.send(cmd).is_err() {
            tracing::debug!("hub coordinator stopped; broadcast dropped");
        }
    }

    /// Number of currently registered connections.
    ///
    /// Maintained by the coordinator; exposed for the health endpoint and
    /// logging only, never for routing decisions.
    pub fn online_count(&self) -> usize {
        self.online.load(Ordering::Relaxed)
    }
}

/// The coordinator state machine.
///
/// Owns the user → connection table exclusively. Reachable only through a
/// [`HubHandle`]; no other task ever touches the table.
pub struct Hub {
    clients: HashMap<UserId, Client>,
    online: Arc<AtomicUsize>,
    register_rx: mpsc::UnboundedReceiver<Client>,
    unregister_rx: mpsc::UnboundedReceiver<Unregister>,
    route_rx: mpsc::UnboundedReceiver<RouteCommand>,
}

impl Hub {
    /// Creates the coordinator and its first handle.
    pub fn new() -> (Self, HubHandle) {
        let (register_tx, register_rx) = mpsc::unbounded_channel();
        let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
        let (route_tx, route_rx) = mpsc::unbounded_channel();
        let online = Arc::new(AtomicUsize::new(0));

        let hub = Self {
            clients: HashMap::new(),
            online: Arc::clone(&online),
            register_rx,
            unregister_rx,
            route_rx,
        };
        let handle = HubHandle {
            register_tx,
            unregister_tx,
            route_tx,
            online,
        };
        (hub, handle)
    }

    /// Creates the coordinator and spawns its task, returning the handle.
    pub fn spawn() -> HubHandle {
        let (hub, handle) = Self::new();
        tokio::spawn(hub.run());
        handle
    }

    /// Runs the coordinator loop.
    ///
    /// Processes one control event at a time, so no two table transitions
    /// ever race. Returns only when every handle has been dropped, which
    /// for the server means never.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(client) = self.register_rx.recv() => self.handle_register(client),
                Some(req) = self.unregister_rx.recv() => self.handle_unregister(req),
                Some(cmd) = self.route_rx.recv() => self.handle_route(cmd),
                else => break,
            }
        }
        tracing::debug!("hub coordinator stopped");
    }

    fn handle_register(&mut self, client: Client) {
        let user_id = client.user_id;
        let conn_id = client.conn_id;

        if let Some(superseded) = self.clients.insert(user_id, client) {
            // Dropping the previous handle closes its outbound queue; the
            // old write pump then terminates and closes its transport.
            tracing::info!(
                user_id = %user_id,
                old_conn_id = %superseded.conn_id,
                new_conn_id = %conn_id,
                "connection superseded, evicting previous"
            );
        } else {
            self.online.fetch_add(1, Ordering::Relaxed);
        }
        tracing::info!(user_id = %user_id, conn_id = %conn_id, "connection registered");
    }

    fn handle_unregister(&mut self, req: Unregister) {
        match self.clients.get(&req.user_id) {
            Some(current) if current.conn_id == req.conn_id => {
                self.clients.remove(&req.user_id);
                self.online.fetch_sub(1, Ordering::Relaxed);
                tracing::info!(
                    user_id = %req.user_id,
                    conn_id = %req.conn_id,
                    "connection unregistered"
                );
            }
            // Stale request from a superseded connection, or already gone.
            _ => {
                tracing::debug!(
                    user_id = %req.user_id,
                    conn_id = %req.conn_id,
                    "stale unregister ignored"
                );
            }
        }
    }

    fn handle_route(&mut self, cmd: RouteCommand) {
        match cmd {
            RouteCommand::Direct { to, frame } => {
                let Some(client) = self.clients.get(&to) else {
                    tracing::debug!(to = %to, "recipient offline, frame dropped");
                    return;
                };
                if let Err(failure) = client.try_deliver(frame) {
                    tracing::warn!(user_id = %to, ?failure, "delivery failed, evicting");
                    self.evict(to);
                }
            }
            RouteCommand::Broadcast { frame, exclude } => {
                let mut dead = Vec::new();
                for (user_id, client) in &self.clients {
                    if Some(*user_id) == exclude {
                        continue;
                    }
                    if let Err(failure) = client.try_deliver(frame.clone()) {
                        tracing::warn!(user_id = %user_id, ?failure, "delivery failed, evicting");
                        dead.push(*user_id);
                    }
                }
                for user_id in dead {
                    self.evict(user_id);
                }
            }
        }
    }

    /// Removes a dead connection from the table, closing its queue.
    fn evict(&mut self, user_id: UserId) {
        if self.clients.remove(&user_id).is_some() {
            self.online.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::Receiver;

    // Unit tests drive the coordinator's handlers directly, which makes
    // every interleaving deterministic. The spawned-task path is covered
    // by the integration tests.

    fn registered(
        hub: &mut Hub,
        user: i64,
        capacity: usize,
    ) -> (ConnectionId, Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn_id = ConnectionId::new();
        hub.handle_register(Client::new(UserId::new(user), conn_id, tx));
        (conn_id, rx)
    }

    fn direct(hub: &mut Hub, to: i64, frame: &str) {
        hub.handle_route(RouteCommand::Direct {
            to: UserId::new(to),
            frame: frame.to_string(),
        });
    }

    fn broadcast(hub: &mut Hub, frame: &str, exclude: Option<i64>) {
        hub.handle_route(RouteCommand::Broadcast {
            frame: frame.to_string(),
            exclude: exclude.map(UserId::new),
        });
    }

    mod registration {
        use super::*;

        #[tokio::test]
        async fn register_makes_user_reachable() {
            let (mut hub, _handle) = Hub::new();
            let (_conn, mut rx) = registered(&mut hub, 1, 8);

            direct(&mut hub, 1, "hello");

            assert_eq!(rx.try_recv().unwrap(), "hello");
        }

        #[tokio::test]
        async fn table_never_holds_two_connections_for_one_user() {
            let (mut hub, _handle) = Hub::new();
            let (_old, mut old_rx) = registered(&mut hub, 1, 8);
            let (_new, mut new_rx) = registered(&mut hub, 1, 8);

            direct(&mut hub, 1, "to-the-live-one");

            // The superseded queue is closed, not written to.
            assert!(old_rx.try_recv().is_err());
            assert_eq!(new_rx.try_recv().unwrap(), "to-the-live-one");
            assert_eq!(hub.clients.len(), 1);
        }

        #[tokio::test]
        async fn superseded_connection_queue_is_closed() {
            let (mut hub, _handle) = Hub::new();
            let (_old, mut old_rx) = registered(&mut hub, 1, 8);
            let (_new, _new_rx) = registered(&mut hub, 1, 8);

            // recv() returning None is the write pump's close signal.
            assert_eq!(old_rx.recv().await, None);
        }

        #[tokio::test]
        async fn online_count_tracks_distinct_users() {
            let (mut hub, handle) = Hub::new();
            let (_c1, _rx1) = registered(&mut hub, 1, 8);
            let (_c2, _rx2) = registered(&mut hub, 2, 8);
            assert_eq!(handle.online_count(), 2);

            // Superseding the same user is not a net change.
            let (_c3, _rx3) = registered(&mut hub, 1, 8);
            assert_eq!(handle.online_count(), 2);
        }
    }

    mod unregistration {
        use super::*;

        #[tokio::test]
        async fn unregister_removes_matching_connection() {
            let (mut hub, handle) = Hub::new();
            let (conn, _rx) = registered(&mut hub, 1, 8);

            hub.handle_unregister(Unregister {
                user_id: UserId::new(1),
                conn_id: conn,
            });

            assert!(hub.clients.is_empty());
            assert_eq!(handle.online_count(), 0);
        }

        #[tokio::test]
        async fn stale_unregister_keeps_successor() {
            let (mut hub, _handle) = Hub::new();
            let (old_conn, _old_rx) = registered(&mut hub, 1, 8);
            let (_new_conn, mut new_rx) = registered(&mut hub, 1, 8);

            // The superseded connection's cleanup races in after the new
            // registration; it must not delete the successor's entry.
            hub.handle_unregister(Unregister {
                user_id: UserId::new(1),
                conn_id: old_conn,
            });

            direct(&mut hub, 1, "still-here");
            assert_eq!(new_rx.try_recv().unwrap(), "still-here");
        }

        #[tokio::test]
        async fn unregister_is_idempotent() {
            let (mut hub, handle) = Hub::new();
            let (conn, _rx) = registered(&mut hub, 1, 8);

            let req = || Unregister {
                user_id: UserId::new(1),
                conn_id: conn,
            };
            hub.handle_unregister(req());
            hub.handle_unregister(req());

            assert_eq!(handle.online_count(), 0);
        }
    }

    mod delivery {
        use super::*;

        #[tokio::test]
        async fn send_to_absent_user_is_a_noop() {
            let (mut hub, _handle) = Hub::new();
            // Must not panic or error; best-effort delivery.
            direct(&mut hub, 99, "nobody-home");
        }

        #[tokio::test]
        async fn broadcast_excludes_the_sender() {
            let (mut hub, _handle) = Hub::new();
            let (_c1, mut rx1) = registered(&mut hub, 1, 8);
            let (_c2, mut rx2) = registered(&mut hub, 2, 8);
            let (_c3, mut rx3) = registered(&mut hub, 3, 8);

            broadcast(&mut hub, "fanout", Some(1));

            assert!(rx1.try_recv().is_err());
            assert_eq!(rx2.try_recv().unwrap(), "fanout");
            assert_eq!(rx3.try_recv().unwrap(), "fanout");
        }

        #[tokio::test]
        async fn broadcast_without_registered_sender_reaches_everyone() {
            let (mut hub, _handle) = Hub::new();
            let (_c1, mut rx1) = registered(&mut hub, 1, 8);
            let (_c2, mut rx2) = registered(&mut hub, 2, 8);

            broadcast(&mut hub, "fanout", Some(42));

            assert_eq!(rx1.try_recv().unwrap(), "fanout");
            assert_eq!(rx2.try_recv().unwrap(), "fanout");
        }

        #[tokio::test]
        async fn full_queue_evicts_only_the_slow_consumer() {
            let (mut hub, handle) = Hub::new();
            let (_slow, mut slow_rx) = registered(&mut hub, 1, 1);
            let (_fast, mut fast_rx) = registered(&mut hub, 2, 8);

            // Fill the slow consumer's queue.
            direct(&mut hub, 1, "fills-the-queue");

            broadcast(&mut hub, "fanout", None);

            // The fast consumer still received the broadcast frame.
            assert_eq!(fast_rx.try_recv().unwrap(), "fanout");
            // The slow consumer was evicted and its queue closed.
            assert_eq!(handle.online_count(), 1);
            assert_eq!(slow_rx.try_recv().unwrap(), "fills-the-queue");
            assert_eq!(slow_rx.recv().await, None);
        }

        #[tokio::test]
        async fn direct_send_to_full_queue_evicts_recipient() {
            let (mut hub, handle) = Hub::new();
            let (_conn, _rx) = registered(&mut hub, 1, 1);

            direct(&mut hub, 1, "fits");
            direct(&mut hub, 1, "overflows");

            assert_eq!(handle.online_count(), 0);
        }

        #[tokio::test]
        async fn closed_queue_is_treated_like_a_dead_connection() {
            let (mut hub, handle) = Hub::new();
            let (_conn, rx) = registered(&mut hub, 1, 8);
            drop(rx);

            direct(&mut hub, 1, "into-the-void");

            assert_eq!(handle.online_count(), 0);
        }

        #[tokio::test]
        async fn per_connection_outbound_order_is_fifo() {
            let (mut hub, _handle) = Hub::new();
            let (_conn, mut rx) = registered(&mut hub, 1, 8);

            direct(&mut hub, 1, "one");
            broadcast(&mut hub, "two", None);
            direct(&mut hub, 1, "three");

            assert_eq!(rx.try_recv().unwrap(), "one");
            assert_eq!(rx.try_recv().unwrap(), "two");
            assert_eq!(rx.try_recv().unwrap(), "three");
        }
    }

    mod coordinator_task {
        use super::*;

        #[tokio::test]
        async fn run_exits_when_all_handles_drop() {
            let (hub, handle) = Hub::new();
            let task = tokio::spawn(hub.run());
            drop(handle);

            task.await.unwrap();
        }
    }
}

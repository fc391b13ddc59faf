//! `RendezvousServer` builder and event loop.
//!
//! This is the entry point for running a Meetpoint server. It ties the
//! layers together: transport → protocol → roster.
//!
//! The loop is deliberately single-writer: one task owns the peer
//! registry and the connection table, and drains the transport event
//! feed in bounded batches. Every registry mutation, every codec call,
//! and every broadcast send happens synchronously inside the event step
//! that triggered it, so no locking or transactional discipline is
//! needed anywhere downstream of the feed.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use meetpoint_roster::{BroadcastCoordinator, PeerRegistry};
use meetpoint_transport::{
    Connection, ConnectionId, EventFeed, TransportEvent,
    WebSocketConnection, WebSocketTransport,
};

use crate::handler::{BindingHandler, PacketOutcome};
use crate::MeetpointError;

/// Lifecycle of a single connection, as the server loop sees it.
///
/// `Connecting` covers transport-level setup before the event feed
/// reports the connection; the loop itself only ever stores the later
/// states. The only transition the rendezvous core drives is
/// `Connected → Bound`, exactly on an accepted binding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Transport is still setting the connection up.
    Connecting,
    /// Accepted by the transport, no binding exchange yet.
    Connected,
    /// Completed the binding exchange; present in the roster.
    Bound,
    /// Gone. Terminal; the loop drops its entries on this transition.
    Disconnected,
}

/// Builder for configuring and starting a Meetpoint server.
///
/// # Example
///
/// ```rust,ignore
/// let server = RendezvousServer::builder()
///     .bind("0.0.0.0:3478")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct RendezvousServerBuilder {
    bind_addr: String,
    poll_interval: Duration,
    max_batch: usize,
}

impl RendezvousServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3478".to_string(),
            poll_interval: Duration::from_millis(10),
            max_batch: 32,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how long one poll of the event feed may wait.
    ///
    /// Short enough to stay responsive, long enough not to busy-spin.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum number of events handled per poll.
    pub fn max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// Binds the transport and builds the server.
    pub async fn build(self) -> Result<RendezvousServer, MeetpointError> {
        let transport =
            WebSocketTransport::bind(&self.bind_addr).await?;
        Ok(RendezvousServer {
            transport,
            poll_interval: self.poll_interval,
            max_batch: self.max_batch,
        })
    }
}

impl Default for RendezvousServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Meetpoint rendezvous server, bound and ready to run.
///
/// Call [`run()`](Self::run) to start the event loop.
pub struct RendezvousServer {
    transport: WebSocketTransport,
    poll_interval: Duration,
    max_batch: usize,
}

impl RendezvousServer {
    /// Creates a new builder.
    pub fn builder() -> RendezvousServerBuilder {
        RendezvousServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the event loop until the transport event feed closes.
    ///
    /// Each batch of events is processed in order: connects populate the
    /// connection table, payloads go through the [`BindingHandler`], and
    /// every accepted binding triggers a roster broadcast. Disconnects
    /// drop the peer from both the table and the roster.
    pub async fn run(self) -> Result<(), MeetpointError> {
        tracing::info!("Meetpoint rendezvous server running");

        let mut feed = EventFeed::spawn(self.transport, 64);
        let handler = BindingHandler::new();
        let coordinator = BroadcastCoordinator::new();
        let mut registry = PeerRegistry::new();
        let mut conns: HashMap<ConnectionId, WebSocketConnection> =
            HashMap::new();
        let mut states: HashMap<ConnectionId, ConnState> = HashMap::new();

        while let Some(batch) =
            feed.next_batch(self.max_batch, self.poll_interval).await
        {
            for event in batch {
                match event {
                    TransportEvent::Connected { conn } => {
                        let id = conn.id();
                        tracing::debug!(
                            %id,
                            addr = %conn.peer_addr(),
                            "connection established"
                        );
                        states.insert(id, ConnState::Connected);
                        conns.insert(id, conn);
                    }

                    TransportEvent::Message { id, payload } => {
                        let Some(conn) = conns.get(&id) else {
                            // Raced with a disconnect; nothing to do.
                            continue;
                        };
                        match handler
                            .on_packet(conn, &mut registry, &payload)
                            .await
                        {
                            Ok(PacketOutcome::Accepted { .. }) => {
                                states.insert(id, ConnState::Bound);
                                broadcast_roster(
                                    &coordinator,
                                    &registry,
                                    &conns,
                                )
                                .await;
                            }
                            Ok(PacketOutcome::Rejected) => {}
                            Ok(PacketOutcome::NotProtocol) => {
                                // Generic message path: out of scope
                                // for the rendezvous core, so drop.
                                tracing::debug!(
                                    %id,
                                    len = payload.len(),
                                    "ignoring non-protocol payload"
                                );
                            }
                            Err(e) => {
                                tracing::debug!(
                                    %id,
                                    error = %e,
                                    "binding reply failed"
                                );
                            }
                        }
                    }

                    TransportEvent::Disconnected { id } => {
                        let prev = states.remove(&id);
                        tracing::info!(
                            %id,
                            ?prev,
                            "connection closed"
                        );
                        conns.remove(&id);
                        registry.remove(id);
                    }
                }
            }
        }

        Ok(())
    }
}

/// Fans the current roster out to every registered peer.
///
/// Announcements go over the unreliable channel; a failed or dropped
/// send is logged and skipped, since the next round re-sends everything
/// anyway.
async fn broadcast_roster(
    coordinator: &BroadcastCoordinator,
    registry: &PeerRegistry,
    conns: &HashMap<ConnectionId, WebSocketConnection>,
) {
    let deliveries = match coordinator.maybe_broadcast(registry) {
        Ok(deliveries) => deliveries,
        Err(e) => {
            tracing::error!(error = %e, "broadcast round failed");
            return;
        }
    };

    for delivery in deliveries {
        let Some(conn) = conns.get(&delivery.to) else {
            continue;
        };
        if let Err(e) = conn.send_unreliable(&delivery.payload).await {
            tracing::debug!(
                id = %delivery.to,
                error = %e,
                "announcement send failed, skipping"
            );
        }
    }
}

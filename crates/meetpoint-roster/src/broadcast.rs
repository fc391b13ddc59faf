//! Broadcast coordinator: roster fan-out on registration.
//!
//! On every new registration the entire roster is re-announced to every
//! registered peer — a full O(n²) round, including pairs whose
//! information hasn't changed since the last round. That redundancy is
//! the contract: delivery is over the unreliable channel, so a peer
//! that missed an announcement picks it up on the next round, and stale
//! data is superseded by identical or updated values. An incremental
//! strategy could replace this coordinator without touching the codec
//! or the binding handler.

use meetpoint_protocol::{encode_announcement, PeerAnnouncement};
use meetpoint_transport::ConnectionId;

use crate::{PeerRegistry, RosterError};

/// One message from a broadcast round: which connection gets which
/// payload. The caller performs the actual sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The recipient connection.
    pub to: ConnectionId,
    /// The encoded [`PeerAnnouncement`].
    pub payload: Vec<u8>,
}

/// Computes introduction rounds from roster snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct BroadcastCoordinator;

impl BroadcastCoordinator {
    /// Creates a coordinator.
    pub fn new() -> Self {
        Self
    }

    /// Computes the fan-out for the current roster.
    ///
    /// Returns one delivery per ordered pair `(announced, recipient)`
    /// with distinct peers — `n * (n - 1)` messages for `n` peers — or
    /// nothing at all while fewer than two peers are registered.
    pub fn maybe_broadcast(
        &self,
        registry: &PeerRegistry,
    ) -> Result<Vec<Delivery>, RosterError> {
        let peers = registry.snapshot();
        if peers.len() < 2 {
            return Ok(Vec::new());
        }

        let mut deliveries =
            Vec::with_capacity(peers.len() * (peers.len() - 1));
        for announced in peers {
            let payload = encode_announcement(&PeerAnnouncement {
                index: announced.index,
                ip: announced.public_addr.ip(),
                port: announced.public_addr.port(),
            })?;
            for recipient in peers {
                if recipient.conn_id == announced.conn_id {
                    continue;
                }
                deliveries.push(Delivery {
                    to: recipient.conn_id,
                    payload: payload.clone(),
                });
            }
        }

        tracing::debug!(
            peers = peers.len(),
            deliveries = deliveries.len(),
            "broadcast round computed"
        );
        Ok(deliveries)
    }
}

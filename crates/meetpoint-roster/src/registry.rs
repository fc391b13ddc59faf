//! The peer registry: ordered records of bound connections.

use std::net::SocketAddr;

use meetpoint_transport::ConnectionId;

/// One registered peer.
///
/// Created the first time a connection completes the binding exchange.
/// The connection itself is owned by the server's connection table; the
/// record only carries its id as a back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerRecord {
    /// The underlying connection.
    pub conn_id: ConnectionId,
    /// Public IP and port as observed by the transport at binding time.
    pub public_addr: SocketAddr,
    /// Monotonic index assigned at first registration. Stable for the
    /// connection's lifetime and never reused after removal.
    pub index: u64,
}

/// Outcome of a [`PeerRegistry::register`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First binding on this connection; a record was appended.
    New(u64),
    /// The connection was already registered; its endpoint was
    /// refreshed, the index kept.
    Refreshed(u64),
}

impl Registration {
    /// The registration index involved, new or kept.
    pub fn index(&self) -> u64 {
        match self {
            Self::New(i) | Self::Refreshed(i) => *i,
        }
    }
}

/// Ordered sequence of peer records, registration order preserved.
///
/// Exclusively owned by the server loop — there is exactly one writer
/// and no concurrent readers, so no interior locking is needed.
///
/// Registration is an idempotent upsert keyed by connection: a peer
/// re-sending a binding request refreshes its stored endpoint but keeps
/// its place in the order, so the roster can't grow unbounded from one
/// connection. Disconnected peers are removed; their indices are
/// retired, not recycled.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    records: Vec<PeerRecord>,
    next_index: u64,
}

impl PeerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bound connection, upserting by connection id.
    pub fn register(
        &mut self,
        conn_id: ConnectionId,
        public_addr: SocketAddr,
    ) -> Registration {
        if let Some(record) =
            self.records.iter_mut().find(|r| r.conn_id == conn_id)
        {
            record.public_addr = public_addr;
            tracing::debug!(
                %conn_id,
                %public_addr,
                index = record.index,
                "peer re-registered"
            );
            return Registration::Refreshed(record.index);
        }

        let index = self.next_index;
        self.next_index += 1;
        self.records.push(PeerRecord {
            conn_id,
            public_addr,
            index,
        });
        tracing::info!(%conn_id, %public_addr, index, "peer registered");
        Registration::New(index)
    }

    /// Removes the record for a closed connection, if one exists.
    pub fn remove(&mut self, conn_id: ConnectionId) -> Option<PeerRecord> {
        let pos =
            self.records.iter().position(|r| r.conn_id == conn_id)?;
        let record = self.records.remove(pos);
        tracing::info!(
            %conn_id,
            index = record.index,
            remaining = self.records.len(),
            "peer removed"
        );
        Some(record)
    }

    /// Looks up the record for a connection.
    pub fn get(&self, conn_id: ConnectionId) -> Option<&PeerRecord> {
        self.records.iter().find(|r| r.conn_id == conn_id)
    }

    /// The current roster in registration order.
    pub fn snapshot(&self) -> &[PeerRecord] {
        &self.records
    }

    /// Number of registered peers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no peers are registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        format!("192.0.2.1:{port}").parse().unwrap()
    }

    #[test]
    fn test_register_assigns_monotonic_indices() {
        let mut reg = PeerRegistry::new();
        assert_eq!(
            reg.register(ConnectionId::new(1), addr(1000)),
            Registration::New(0)
        );
        assert_eq!(
            reg.register(ConnectionId::new(2), addr(1001)),
            Registration::New(1)
        );
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_reregister_keeps_index_and_refreshes_endpoint() {
        let mut reg = PeerRegistry::new();
        reg.register(ConnectionId::new(1), addr(1000));
        let outcome = reg.register(ConnectionId::new(1), addr(2000));
        assert_eq!(outcome, Registration::Refreshed(0));
        assert_eq!(reg.len(), 1, "upsert must not grow the roster");
        assert_eq!(
            reg.get(ConnectionId::new(1)).unwrap().public_addr,
            addr(2000)
        );
    }

    #[test]
    fn test_remove_retires_index() {
        let mut reg = PeerRegistry::new();
        reg.register(ConnectionId::new(1), addr(1000));
        reg.register(ConnectionId::new(2), addr(1001));
        let removed = reg.remove(ConnectionId::new(1)).unwrap();
        assert_eq!(removed.index, 0);
        assert_eq!(reg.len(), 1);

        // A later registration gets a fresh index, not the retired one.
        assert_eq!(
            reg.register(ConnectionId::new(3), addr(1002)),
            Registration::New(2)
        );
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut reg = PeerRegistry::new();
        assert!(reg.remove(ConnectionId::new(9)).is_none());
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let mut reg = PeerRegistry::new();
        for n in [5u64, 3, 8] {
            reg.register(ConnectionId::new(n), addr(1000 + n as u16));
        }
        let order: Vec<u64> = reg
            .snapshot()
            .iter()
            .map(|r| r.conn_id.into_inner())
            .collect();
        assert_eq!(order, vec![5, 3, 8]);
    }
}

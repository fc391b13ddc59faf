//! Transport abstraction layer for Meetpoint.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! different network protocols, plus the [`EventFeed`] that funnels every
//! connection's activity into a single event stream for the server loop.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

mod error;
mod events;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use events::{EventFeed, TransportEvent};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// The returned futures are `Send` so the [`EventFeed`] can drive the
/// accept loop and per-connection pumps from spawned tasks; `async fn`
/// sugar in the trait would leave that unguaranteed. Implementations
/// can still be written as plain `async fn`s.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send;

    /// Gracefully shuts down the transport, stopping new connections.
    fn shutdown(
        &self,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A single connection that can send and receive bytes.
///
/// Connections are cheap to clone — implementations share the underlying
/// stream behind an `Arc`, so one clone can sit in the server's connection
/// table while another feeds the event pump.
pub trait Connection: Clone + Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer over the reliable-ordered channel.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send;

    /// Sends data over an unreliable channel.
    ///
    /// The transport may reorder or drop these messages. Defaults to
    /// reliable send; transports with a true unreliable mode (e.g.,
    /// WebTransport datagrams) should override this.
    fn send_unreliable(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.send(data)
    }

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the remote peer's address as observed by this server.
    ///
    /// For a peer behind NAT this is the externally visible endpoint,
    /// which is exactly what the rendezvous core needs to hand out.
    fn peer_addr(&self) -> SocketAddr;
}

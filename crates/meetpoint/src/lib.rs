//! # Meetpoint
//!
//! A rendezvous server for NAT traversal. Clients connect, perform a
//! minimal STUN-style binding handshake to learn their externally
//! observed address, and the server introduces registered peers to one
//! another by broadcasting each peer's public endpoint. The actual hole
//! punching happens client-side, elsewhere.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meetpoint::RendezvousServer;
//!
//! # async fn run() -> Result<(), meetpoint::MeetpointError> {
//! let server = RendezvousServer::builder()
//!     .bind("0.0.0.0:3478")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::MeetpointError;
pub use handler::{BindingHandler, PacketOutcome};
pub use server::{ConnState, RendezvousServer, RendezvousServerBuilder};

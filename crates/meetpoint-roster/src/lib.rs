//! Peer roster and broadcast fan-out for Meetpoint.
//!
//! The roster is the server's view of every bound connection: who is
//! registered, in what order, and at which observed public endpoint.
//! Whenever a registration lands, the [`BroadcastCoordinator`] turns the
//! current roster into the set of introduction messages each peer should
//! receive.
//!
//! # Key types
//!
//! - [`PeerRegistry`] — ordered collection of [`PeerRecord`]s
//! - [`BroadcastCoordinator`] — computes the fan-out for one round
//! - [`Delivery`] — one (recipient, payload) pair from a round

mod broadcast;
mod error;
mod registry;

pub use broadcast::{BroadcastCoordinator, Delivery};
pub use error::RosterError;
pub use registry::{PeerRecord, PeerRegistry, Registration};

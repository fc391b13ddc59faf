//! Binding handler: validates inbound payloads and answers requests.
//!
//! Every payload the transport delivers goes through [`BindingHandler::
//! on_packet`], which sorts it into one of three outcomes:
//!
//! - **Accepted** — a valid binding request. The peer is registered in
//!   the roster (using the transport-observed public endpoint) and a
//!   binding success echoing the transaction id goes back over the
//!   reliable channel.
//! - **Rejected** — a conformant STUN header whose type the server role
//!   doesn't handle. No response.
//! - **NotProtocol** — not a STUN message at all (short, or wrong
//!   cookie). No response, no roster change; the caller hands the
//!   payload to its generic message path.

use meetpoint_protocol::{
    decode, encode_binding_success, MessageType, ProtocolError,
    TransactionId,
};
use meetpoint_roster::{PeerRegistry, Registration};
use meetpoint_transport::{Connection, TransportError};

use crate::MeetpointError;

/// How a payload was classified, and what happened as a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketOutcome {
    /// A valid binding request: registered and answered.
    Accepted {
        /// Whether the roster grew or an existing entry was refreshed.
        registration: Registration,
        /// The echoed transaction id.
        transaction_id: TransactionId,
    },
    /// Conformant header, unsupported type in the server role.
    Rejected,
    /// Not a protocol message; belongs to the generic message path.
    NotProtocol,
}

/// Stateless validator/responder for the binding exchange.
///
/// Roster state lives in the [`PeerRegistry`] the caller passes in, so
/// the handler itself can be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingHandler;

impl BindingHandler {
    /// Creates a handler.
    pub fn new() -> Self {
        Self
    }

    /// Processes one inbound payload from `conn`.
    ///
    /// On Accepted, the registry is updated and the success response is
    /// sent before this returns — registration and reply are one
    /// synchronous step of the event loop.
    ///
    /// # Errors
    ///
    /// Only the reply send can fail; classification itself never does.
    pub async fn on_packet<C>(
        &self,
        conn: &C,
        registry: &mut PeerRegistry,
        payload: &[u8],
    ) -> Result<PacketOutcome, MeetpointError>
    where
        C: Connection<Error = TransportError>,
    {
        let msg = match decode(payload) {
            Ok(msg) => msg,
            Err(e) if e.is_not_stun() => {
                tracing::trace!(
                    id = %conn.id(),
                    len = payload.len(),
                    "non-protocol payload"
                );
                return Ok(PacketOutcome::NotProtocol);
            }
            Err(ProtocolError::UnsupportedType(raw)) => {
                tracing::debug!(
                    id = %conn.id(),
                    raw_type = raw,
                    "unsupported message type"
                );
                return Ok(PacketOutcome::Rejected);
            }
            Err(e) => return Err(e.into()),
        };

        match msg.msg_type {
            MessageType::BindingRequest => {
                let registration =
                    registry.register(conn.id(), conn.peer_addr());
                let response =
                    encode_binding_success(&msg.transaction_id);
                conn.send(&response)
                    .await
                    .map_err(MeetpointError::Transport)?;
                tracing::debug!(
                    id = %conn.id(),
                    tid = %msg.transaction_id,
                    "binding success sent"
                );
                Ok(PacketOutcome::Accepted {
                    registration,
                    transaction_id: msg.transaction_id,
                })
            }
            // A success message is something the server sends, never
            // receives.
            MessageType::BindingSuccess => {
                tracing::debug!(
                    id = %conn.id(),
                    "binding success from client, rejecting"
                );
                Ok(PacketOutcome::Rejected)
            }
        }
    }
}

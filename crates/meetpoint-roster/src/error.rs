//! Error types for the roster layer.

use meetpoint_protocol::ProtocolError;

/// Errors that can occur during roster operations.
///
/// Registry mutation itself is infallible; the only failure mode is
/// serializing announcement payloads during a broadcast round.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Encoding a broadcast payload failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

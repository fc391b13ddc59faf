//! Unified error type for the Meetpoint server.

use meetpoint_protocol::ProtocolError;
use meetpoint_roster::RosterError;
use meetpoint_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MeetpointError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A roster-level error (broadcast payload encoding).
    #[error(transparent)]
    Roster(#[from] RosterError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let top: MeetpointError = err.into();
        assert!(matches!(top, MeetpointError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::NotStun("truncated header");
        let top: MeetpointError = err.into();
        assert!(matches!(top, MeetpointError::Protocol(_)));
    }

    #[test]
    fn test_from_roster_error() {
        let err: RosterError =
            ProtocolError::UnsupportedType(0x7fff).into();
        let top: MeetpointError = err.into();
        assert!(matches!(top, MeetpointError::Roster(_)));
    }
}

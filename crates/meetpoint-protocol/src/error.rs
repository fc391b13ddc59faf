//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// The split matters to the server's dispatch: [`NotStun`] means the
/// payload is not a protocol message at all (it falls through to the
/// generic message path, no reply), while [`UnsupportedType`] means the
/// header is conformant but carries a type this role doesn't handle
/// (rejected, no reply).
///
/// [`NotStun`]: ProtocolError::NotStun
/// [`UnsupportedType`]: ProtocolError::UnsupportedType
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The payload is not a STUN message: too short for the fixed
    /// header, or the magic cookie doesn't match.
    #[error("not a STUN message: {0}")]
    NotStun(&'static str),

    /// A conformant header with a 16-bit type outside the binding
    /// profile.
    #[error("unsupported message type: {0:#06x}")]
    UnsupportedType(u16),

    /// Serializing an announcement payload failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserializing an announcement payload failed.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ProtocolError {
    /// Whether this error means "not a protocol message at all"
    /// (as opposed to a conformant-but-unsupported one).
    pub fn is_not_stun(&self) -> bool {
        matches!(self, Self::NotStun(_))
    }
}

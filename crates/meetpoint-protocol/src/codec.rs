//! Encoding and decoding of the fixed binding-message wire format.
//!
//! The header layout (20 bytes, no attributes):
//!
//! ```text
//! 0       2       4               8                              20
//! +-------+-------+---------------+------------------------------+
//! | type  | length| magic cookie  | transaction id (12 bytes)    |
//! +-------+-------+---------------+------------------------------+
//! ```
//!
//! All multi-byte fields are big-endian. Encoding and decoding go
//! field-by-field through `from_be_bytes`/`to_be_bytes` over slices —
//! never by reinterpreting a struct's memory — so host byte order and
//! alignment can't leak into the wire format.

use crate::error::ProtocolError;
use crate::types::{
    MessageType, PeerAnnouncement, StunMessage, TransactionId, HEADER_LEN,
    MAGIC_COOKIE, TRANSACTION_ID_LEN,
};

/// Parses a payload as a STUN binding message.
///
/// # Errors
///
/// - [`ProtocolError::NotStun`] if the payload is shorter than the
///   fixed header or the magic cookie doesn't match — the payload is
///   not a protocol message at all.
/// - [`ProtocolError::UnsupportedType`] if the header is conformant
///   but the type field is outside the binding profile.
pub fn decode(bytes: &[u8]) -> Result<StunMessage, ProtocolError> {
    if bytes.len() < HEADER_LEN {
        return Err(ProtocolError::NotStun("truncated header"));
    }

    // Validate the cookie before looking at the type: a wrong cookie
    // means "not ours", whatever the other fields say.
    let magic = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if magic != MAGIC_COOKIE {
        return Err(ProtocolError::NotStun("magic cookie mismatch"));
    }

    let raw_type = u16::from_be_bytes([bytes[0], bytes[1]]);
    let msg_type = MessageType::from_wire(raw_type)
        .ok_or(ProtocolError::UnsupportedType(raw_type))?;

    // bytes[2..4] is the length field — reserved, always zero in this
    // profile. Ignored on decode for compatibility with senders that
    // fill it in anyway.

    let mut tid = [0u8; TRANSACTION_ID_LEN];
    tid.copy_from_slice(&bytes[8..HEADER_LEN]);

    Ok(StunMessage {
        msg_type,
        transaction_id: TransactionId(tid),
    })
}

/// Builds the fixed header for the given type and transaction id.
fn encode_header(
    msg_type: MessageType,
    transaction_id: &TransactionId,
) -> [u8; HEADER_LEN] {
    let mut buf = [0u8; HEADER_LEN];
    buf[0..2].copy_from_slice(&msg_type.to_wire().to_be_bytes());
    // buf[2..4] stays zero: the reserved length field.
    buf[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    buf[8..HEADER_LEN].copy_from_slice(transaction_id.as_bytes());
    buf
}

/// Encodes a binding success response echoing `transaction_id`
/// byte-for-byte.
pub fn encode_binding_success(
    transaction_id: &TransactionId,
) -> [u8; HEADER_LEN] {
    encode_header(MessageType::BindingSuccess, transaction_id)
}

/// Encodes a binding request with the caller-chosen `transaction_id`.
///
/// The server never sends these; clients (and the integration tests)
/// use this to open the binding exchange.
pub fn encode_binding_request(
    transaction_id: &TransactionId,
) -> [u8; HEADER_LEN] {
    encode_header(MessageType::BindingRequest, transaction_id)
}

/// Serializes a roster announcement for broadcast.
pub fn encode_announcement(
    announcement: &PeerAnnouncement,
) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(announcement).map_err(ProtocolError::Encode)
}

/// Parses a broadcast payload back into an announcement.
pub fn decode_announcement(
    bytes: &[u8],
) -> Result<PeerAnnouncement, ProtocolError> {
    serde_json::from_slice(bytes).map_err(ProtocolError::Decode)
}

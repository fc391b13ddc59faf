//! Core protocol types for Meetpoint's wire format.
//!
//! Two kinds of messages exist: the fixed-layout STUN binding header
//! (hand-encoded big-endian, see `codec`), and the [`PeerAnnouncement`]
//! broadcast payload (serde-serialized JSON).

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// The fixed 32-bit constant marking a message as protocol-conformant.
///
/// Same value RFC 5389 uses; a header whose cookie field doesn't equal
/// this is not a STUN message and is ignored by the binding layer.
pub const MAGIC_COOKIE: u32 = 0x2112_A442;

/// Size of the fixed STUN header: type (2) + length (2) + cookie (4) +
/// transaction id (12). This profile carries no attributes, so every
/// protocol message is exactly this long.
pub const HEADER_LEN: usize = 20;

/// Length of the transaction id field in bytes.
pub const TRANSACTION_ID_LEN: usize = 12;

/// STUN message types supported by the minimal binding profile.
///
/// The discriminants are the on-wire 16-bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MessageType {
    /// A client asking the server for its observed public endpoint.
    BindingRequest = 0x0001,
    /// The server's positive reply, echoing the transaction id.
    BindingSuccess = 0x0101,
}

impl MessageType {
    /// Maps a raw 16-bit wire value to a known message type.
    pub fn from_wire(raw: u16) -> Option<Self> {
        match raw {
            0x0001 => Some(Self::BindingRequest),
            0x0101 => Some(Self::BindingSuccess),
            _ => None,
        }
    }

    /// Returns the on-wire 16-bit value.
    pub fn to_wire(self) -> u16 {
        self as u16
    }
}

/// Opaque 12-byte correlation token chosen by the requester and echoed
/// verbatim by the responder.
///
/// A newtype wrapper so a transaction id can't be confused with any
/// other 12-byte buffer, and so the hex rendering lives in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub [u8; TRANSACTION_ID_LEN]);

impl TransactionId {
    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; TRANSACTION_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A decoded STUN binding message.
///
/// The length field is reserved (always zero in this profile) and the
/// magic cookie is validated at decode time, so neither is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StunMessage {
    /// What kind of binding message this is.
    pub msg_type: MessageType,
    /// The requester-chosen correlation token.
    pub transaction_id: TransactionId,
}

/// One peer's entry in a roster broadcast.
///
/// Sent to every other registered peer whenever the roster changes, so
/// each client learns the public endpoints it can hole-punch toward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAnnouncement {
    /// The announced peer's registration index (stable for the lifetime
    /// of its connection).
    pub index: u64,
    /// The announced peer's public IP as observed by the server.
    pub ip: IpAddr,
    /// The announced peer's public port as observed by the server.
    pub port: u16,
}

impl fmt::Display for PeerAnnouncement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer {} at {}:{}", self.index, self.ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_wire_round_trip() {
        for ty in [MessageType::BindingRequest, MessageType::BindingSuccess]
        {
            assert_eq!(MessageType::from_wire(ty.to_wire()), Some(ty));
        }
    }

    #[test]
    fn test_message_type_unknown_wire_value() {
        assert_eq!(MessageType::from_wire(0x0002), None);
        assert_eq!(MessageType::from_wire(0xffff), None);
    }

    #[test]
    fn test_transaction_id_display_is_hex() {
        let tid = TransactionId([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09,
            0x0a, 0xff,
        ]);
        assert_eq!(tid.to_string(), "000102030405060708090aff");
    }

    #[test]
    fn test_peer_announcement_display() {
        let ann = PeerAnnouncement {
            index: 3,
            ip: "10.0.0.7".parse().unwrap(),
            port: 4242,
        };
        assert_eq!(ann.to_string(), "peer 3 at 10.0.0.7:4242");
    }
}

//! Wire protocol for Meetpoint.
//!
//! This crate defines the "language" that clients and the rendezvous
//! server speak:
//!
//! - **Types** ([`StunMessage`], [`MessageType`], [`TransactionId`],
//!   [`PeerAnnouncement`]) — the structures that travel on the wire.
//! - **Codec** ([`decode`], [`encode_binding_success`], and friends) —
//!   how those messages are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the
//! rendezvous core (peer roster). It doesn't know about connections or
//! registration — it only knows how to parse and build messages.
//!
//! ```text
//! Transport (bytes) → Protocol (StunMessage) → Roster (peer records)
//! ```
//!
//! The binding exchange is the minimal STUN profile: a fixed 20-byte
//! header, no attributes. Everything multi-byte is big-endian on the
//! wire regardless of host byte order — the codec never reinterprets
//! memory, it reads and writes individual fields explicitly.

mod codec;
mod error;
mod types;

pub use codec::{
    decode, decode_announcement, encode_announcement,
    encode_binding_request, encode_binding_success,
};
pub use error::ProtocolError;
pub use types::{
    MessageType, PeerAnnouncement, StunMessage, TransactionId, HEADER_LEN,
    MAGIC_COOKIE, TRANSACTION_ID_LEN,
};

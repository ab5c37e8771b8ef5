//! Management message encoding.
//!
//! Every message is a fixed 8-byte [`Header`] followed by an opaque payload.
//! The payload length in the header is always derived from the payload
//! itself when serializing and checked against the remaining bytes when
//! deserializing.

pub mod codec;
pub mod error;
pub mod header;
pub mod payload;

pub use codec::{Message, deserialize_nmgr_req, serialize_request};
pub use error::{DecodeError, EncodeError};
pub use header::{Group, HEADER_LEN, Header, MAX_PAYLOAD_LEN, Op};
pub use payload::Payload;

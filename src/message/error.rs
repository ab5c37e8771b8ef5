//! Errors raised while encoding or decoding management messages.

use thiserror::Error;

use crate::frame::FrameError;

/// Errors produced while serializing an outbound message.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The payload does not fit the header's 16-bit length field.
    #[error("payload of {len} bytes overflows length field (max {max})")]
    Overflow {
        /// Length of the rejected payload.
        len: usize,
        /// Largest representable payload.
        max: usize,
    },
    /// The serialized message could not be split into frames.
    #[error("failed to frame message: {0}")]
    Frame(#[from] FrameError),
    /// A typed payload could not be encoded.
    #[error("failed to encode payload: {0}")]
    Payload(#[source] bincode::error::EncodeError),
}

/// Errors produced while deserializing an inbound message.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Fewer bytes than a full header were supplied.
    #[error("incomplete message header: have {have}, need {need}")]
    IncompleteHeader {
        /// Bytes available.
        have: usize,
        /// Bytes required for the header.
        need: usize,
    },
    /// The header's payload length disagrees with the bytes that follow it.
    #[error("payload length mismatch: header declares {declared}, found {actual}")]
    LengthMismatch {
        /// Length declared in the header.
        declared: usize,
        /// Bytes actually present after the header.
        actual: usize,
    },
    /// A header field holds a value the protocol does not define.
    #[error("unknown {field} value {value}")]
    UnknownField {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value found on the wire.
        value: u16,
    },
    /// A typed payload could not be decoded.
    #[error("failed to decode payload: {0}")]
    Payload(#[source] bincode::error::DecodeError),
}

//! Errors raised while building or reassembling frames.
//!
//! Every variant is local to a single message: after a failure the decoder
//! is reset and the connection can carry the next message.

use thiserror::Error;

/// Errors produced by the frame codec.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The frame sequence ended before the terminal chunk arrived.
    #[error("message truncated after {received} bytes (expected {expected:?})")]
    Truncated {
        /// Message and checksum bytes received so far.
        received: usize,
        /// Message plus checksum bytes announced by the first frame, if one
        /// arrived.
        expected: Option<usize>,
    },
    /// The checksum trailer does not match the reassembled bytes.
    #[error("frame checksum mismatch: expected {expected:#06x}, got {actual:#06x}")]
    Corrupt {
        /// Checksum declared by the final frame.
        expected: u16,
        /// Checksum computed over the reassembled message.
        actual: u16,
    },
    /// A frame began with bytes that are not a frame marker.
    #[error("invalid frame marker {found:02x?}")]
    InvalidMarker {
        /// The two leading bytes of the rejected frame.
        found: [u8; 2],
    },
    /// A continuation frame arrived with no message in progress.
    #[error("continuation frame without a start frame")]
    UnexpectedContinuation,
    /// A frame was too short to hold its envelope header.
    #[error("incomplete frame header: have {have}, need {need}")]
    IncompleteHeader {
        /// Bytes present in the frame.
        have: usize,
        /// Bytes required for the header.
        need: usize,
    },
    /// The final frame carried bytes beyond its checksum trailer.
    #[error("{extra} unexpected bytes after checksum")]
    TrailingBytes {
        /// Number of surplus bytes.
        extra: usize,
    },
    /// More frames followed a completed message.
    #[error("{extra} unexpected frames after message completed")]
    TrailingFrames {
        /// Number of surplus frames.
        extra: usize,
    },
    /// The message is longer than the length prefix can describe.
    #[error("message of {len} bytes exceeds frame limit of {max}")]
    TooLarge {
        /// Length of the rejected message.
        len: usize,
        /// Largest representable message.
        max: usize,
    },
    /// Appending would grow a frame past its capacity.
    #[error("frame capacity {capacity} exceeded by write reaching {attempted} bytes")]
    CapacityExceeded {
        /// Capacity fixed at construction.
        capacity: usize,
        /// Length the frame would have reached.
        attempted: usize,
    },
    /// A chunk capacity of zero cannot carry any payload.
    #[error("frame chunk capacity must be non-zero")]
    ZeroCapacity,
    /// A full chunk plus the frame envelope would not fit the link's MTU.
    #[error("chunk capacity {capacity} does not fit a maximum frame length of {max_frame_len}")]
    ChunkExceedsMtu {
        /// Configured message bytes per frame.
        capacity: usize,
        /// Largest frame the connection carries.
        max_frame_len: usize,
    },
}

//! Transport framing for serialized management messages.
//!
//! A message is split into one or more [`Frame`]s no larger than the
//! transport allows. The first frame announces the total message length, and
//! the final frame carries a CRC-16 over the whole message, so transports
//! without native error detection still reject damaged data.
//!
//! ```text
//! first:        06 09 | total_len (u16 BE) | chunk | [crc16 (u16 BE) if last]
//! continuation: 04 14 | chunk                | [crc16 (u16 BE) if last]
//! ```
//!
//! [`encode`] and [`decode`] work on complete frame sequences, while
//! [`FrameDecoder`] consumes frames one at a time as a connection yields them.

pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod marker;

pub use buffer::Frame;
pub use decoder::{FrameDecoder, decode};
pub use encoder::{FrameEncoder, encode};
pub use error::FrameError;
pub use marker::{
    CHECKSUM_LEN,
    CONTINUATION_MARKER,
    FRAME_OVERHEAD,
    LENGTH_LEN,
    MARKER_LEN,
    MAX_MESSAGE_LEN,
    START_MARKER,
};

#[cfg(test)]
mod tests;

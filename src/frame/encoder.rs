//! Outbound helper that splits a serialized message into frames.
//!
//! [`FrameEncoder`] caps the message bytes carried per frame at a fixed chunk
//! capacity. Envelope bytes (marker, length prefix, checksum) come on top of
//! that capacity, so a transport with an MTU of `n` should use a chunk
//! capacity of `n - FRAME_OVERHEAD`.

use std::num::NonZeroUsize;

use tracing::trace;

use super::{
    CONTINUATION_MARKER,
    FRAME_OVERHEAD,
    Frame,
    FrameError,
    MAX_MESSAGE_LEN,
    START_MARKER,
};
use crate::{byte_order::write_network_u16, checksum::crc16};

/// Split `message` into frames carrying at most `capacity` message bytes each.
///
/// # Errors
///
/// Returns [`FrameError::ZeroCapacity`] when `capacity` is zero and
/// [`FrameError::TooLarge`] when the message exceeds [`MAX_MESSAGE_LEN`].
///
/// # Examples
///
/// ```
/// use mgmtwire::frame::encode;
///
/// let frames = encode(&[0xaa; 45], 20).expect("encode");
/// assert_eq!(frames.len(), 3);
/// ```
pub fn encode(message: &[u8], capacity: usize) -> Result<Vec<Frame>, FrameError> {
    let capacity = NonZeroUsize::new(capacity).ok_or(FrameError::ZeroCapacity)?;
    FrameEncoder::new(capacity).encode(message)
}

/// Splits messages into frames of a fixed chunk capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameEncoder {
    chunk_capacity: NonZeroUsize,
}

impl FrameEncoder {
    /// Create an encoder that places at most `chunk_capacity` message bytes in
    /// each frame.
    #[must_use]
    pub const fn new(chunk_capacity: NonZeroUsize) -> Self { Self { chunk_capacity } }

    /// Create an encoder whose frames never exceed `mtu` bytes on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ZeroCapacity`] if `mtu` leaves no room for
    /// message bytes after the envelope.
    pub fn for_mtu(mtu: usize) -> Result<Self, FrameError> {
        NonZeroUsize::new(mtu.saturating_sub(FRAME_OVERHEAD))
            .map(Self::new)
            .ok_or(FrameError::ZeroCapacity)
    }

    /// Maximum message bytes carried per frame.
    #[must_use]
    pub const fn chunk_capacity(&self) -> NonZeroUsize { self.chunk_capacity }

    /// Number of frames needed to carry a message of `len` bytes.
    #[must_use]
    pub fn frame_count(&self, len: usize) -> usize {
        len.div_ceil(self.chunk_capacity.get()).max(1)
    }

    /// Split `message` into frames.
    ///
    /// An empty message still produces one frame, and a message of exactly
    /// the chunk capacity produces exactly one.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TooLarge`] when the message exceeds
    /// [`MAX_MESSAGE_LEN`].
    pub fn encode(&self, message: &[u8]) -> Result<Vec<Frame>, FrameError> {
        let total = u16::try_from(message.len()).map_err(|_| FrameError::TooLarge {
            len: message.len(),
            max: MAX_MESSAGE_LEN,
        })?;
        let checksum = write_network_u16(crc16(message));
        let frame_capacity = self.chunk_capacity.get().saturating_add(FRAME_OVERHEAD);
        let count = self.frame_count(message.len());

        let mut frames = Vec::with_capacity(count);
        let mut chunks = message.chunks(self.chunk_capacity.get());
        for index in 0..count {
            let mut frame = Frame::with_capacity(frame_capacity);
            if index == 0 {
                frame.extend(&START_MARKER)?;
                frame.extend(&write_network_u16(total))?;
            } else {
                frame.extend(&CONTINUATION_MARKER)?;
            }
            if let Some(chunk) = chunks.next() {
                frame.extend(chunk)?;
            }
            if index + 1 == count {
                frame.extend(&checksum)?;
            }
            frames.push(frame);
        }

        trace!(len = message.len(), frames = frames.len(), "encoded message frames");
        Ok(frames)
    }
}

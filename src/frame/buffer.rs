//! Bounded byte buffer holding exactly one transport frame.

use bytes::{Bytes, BytesMut};

use super::FrameError;

/// One transport-level unit of bytes.
///
/// A frame has a fixed capacity chosen when it is created. Content can only be
/// appended, and never beyond that capacity.
///
/// # Examples
///
/// ```
/// use mgmtwire::frame::{Frame, FrameError};
///
/// let mut frame = Frame::with_capacity(4);
/// frame.extend(&[1, 2, 3]).expect("fits");
/// assert_eq!(frame.remaining(), 1);
/// assert_eq!(
///     frame.extend(&[4, 5]),
///     Err(FrameError::CapacityExceeded {
///         capacity: 4,
///         attempted: 5
///     })
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    capacity: usize,
    buf: BytesMut,
}

impl Frame {
    /// Create an empty frame that may hold at most `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Wrap bytes received from a transport; the capacity equals their length.
    #[must_use]
    pub fn from_received(bytes: impl AsRef<[u8]>) -> Self {
        let buf = BytesMut::from(bytes.as_ref());
        Self {
            capacity: buf.len(),
            buf,
        }
    }

    /// Append `bytes` to the frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::CapacityExceeded`] if the frame would grow past
    /// its capacity; the frame is left unchanged.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        let attempted = self.buf.len().saturating_add(bytes.len());
        if attempted > self.capacity {
            return Err(FrameError::CapacityExceeded {
                capacity: self.capacity,
                attempted,
            });
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Maximum number of bytes the frame may hold.
    #[must_use]
    pub const fn capacity(&self) -> usize { self.capacity }

    /// Current number of bytes in the frame.
    #[must_use]
    pub fn len(&self) -> usize { self.buf.len() }

    /// Whether the frame holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Bytes that may still be appended.
    #[must_use]
    pub fn remaining(&self) -> usize { self.capacity - self.buf.len() }

    /// Borrow the frame contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.buf }

    /// Consume the frame, returning its contents.
    #[must_use]
    pub fn freeze(self) -> Bytes { self.buf.freeze() }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] { self.as_bytes() }
}

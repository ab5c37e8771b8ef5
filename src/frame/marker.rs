//! Marker bytes and fixed sizes of the frame envelope.

/// Marker opening the first frame of a message.
pub const START_MARKER: [u8; 2] = [0x06, 0x09];

/// Marker opening every subsequent frame of a message.
pub const CONTINUATION_MARKER: [u8; 2] = [0x04, 0x14];

/// Width of a frame marker in bytes.
pub const MARKER_LEN: usize = 2;

/// Width of the total-length prefix carried by the first frame.
pub const LENGTH_LEN: usize = 2;

/// Width of the checksum trailer carried by the final frame.
pub const CHECKSUM_LEN: usize = 2;

/// Worst-case envelope bytes added to a single frame's chunk.
///
/// A single-frame message carries all three: marker, length and checksum.
pub const FRAME_OVERHEAD: usize = MARKER_LEN + LENGTH_LEN + CHECKSUM_LEN;

/// Largest message the total-length prefix can describe.
pub const MAX_MESSAGE_LEN: usize = u16::MAX as usize;

/// Kind of frame identified by its leading marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MarkerKind {
    Start,
    Continuation,
}

impl MarkerKind {
    pub(crate) fn parse(marker: [u8; 2]) -> Option<Self> {
        match marker {
            START_MARKER => Some(Self::Start),
            CONTINUATION_MARKER => Some(Self::Continuation),
            _ => None,
        }
    }
}

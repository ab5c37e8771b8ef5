//! Inbound helper that stitches frames back into complete messages.
//!
//! [`FrameDecoder`] mirrors [`FrameEncoder`](super::FrameEncoder): it learns
//! the message length from the start frame, appends continuation chunks in
//! arrival order, and verifies the checksum once the final bytes arrive.

use bytes::{Bytes, BytesMut};
use tracing::{trace, warn};

use super::{CHECKSUM_LEN, FrameError, LENGTH_LEN, MARKER_LEN, marker::MarkerKind};
use crate::{byte_order::read_network_u16_at, checksum::crc16};

/// Reassemble a complete frame sequence into the original message bytes.
///
/// # Errors
///
/// Returns [`FrameError::Truncated`] if the sequence ends before the final
/// chunk, [`FrameError::Corrupt`] on a checksum mismatch, and
/// [`FrameError::TrailingFrames`] if frames follow the completed message.
///
/// # Examples
///
/// ```
/// use mgmtwire::frame::{decode, encode};
///
/// let message: Vec<u8> = (0..45).collect();
/// let frames = encode(&message, 20).expect("encode");
/// assert_eq!(decode(&frames).expect("decode"), message);
/// ```
pub fn decode<I>(frames: I) -> Result<Bytes, FrameError>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut decoder = FrameDecoder::new();
    let mut frames = frames.into_iter();
    while let Some(frame) = frames.next() {
        if let Some(message) = decoder.push(frame.as_ref())? {
            let extra = frames.count();
            if extra > 0 {
                return Err(FrameError::TrailingFrames { extra });
            }
            return Ok(message);
        }
    }
    Err(decoder.truncation())
}

#[derive(Debug)]
struct PartialMessage {
    expected: usize,
    buffer: BytesMut,
    frames: usize,
}

impl PartialMessage {
    fn new(expected: usize) -> Self {
        Self {
            expected,
            buffer: BytesMut::with_capacity(expected),
            frames: 0,
        }
    }

    fn missing(&self) -> usize { self.expected - self.buffer.len() }
}

/// Stateful reassembler fed one frame at a time.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    partial: Option<PartialMessage>,
}

impl FrameDecoder {
    /// Create a decoder with no message in progress.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Whether a message is partially assembled.
    #[must_use]
    pub fn in_progress(&self) -> bool { self.partial.is_some() }

    /// Message bytes buffered for the message in progress.
    #[must_use]
    pub fn buffered_len(&self) -> usize { self.partial.as_ref().map_or(0, |p| p.buffer.len()) }

    /// Drop any partially assembled message.
    pub fn reset(&mut self) { self.partial = None; }

    /// Feed one frame.
    ///
    /// Returns `Ok(Some(_))` once the frame completes a message, and
    /// `Ok(None)` while more frames are required. A start frame arriving while
    /// another message is in progress discards the earlier partial message.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] describing the malformed frame. The decoder is
    /// reset afterwards and ready for the next start frame.
    pub fn push(&mut self, frame: &[u8]) -> Result<Option<Bytes>, FrameError> {
        let result = self.accept(frame);
        if result.is_err() {
            self.partial = None;
        }
        result
    }

    fn accept(&mut self, frame: &[u8]) -> Result<Option<Bytes>, FrameError> {
        let marker: [u8; MARKER_LEN] = frame
            .get(..MARKER_LEN)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(FrameError::IncompleteHeader {
                have: frame.len(),
                need: MARKER_LEN,
            })?;

        let body = match MarkerKind::parse(marker) {
            Some(MarkerKind::Start) => {
                let total =
                    read_network_u16_at(frame, MARKER_LEN).ok_or(FrameError::IncompleteHeader {
                        have: frame.len(),
                        need: MARKER_LEN + LENGTH_LEN,
                    })?;
                if let Some(stale) = self.partial.take() {
                    warn!(
                        buffered = stale.buffer.len(),
                        expected = stale.expected,
                        "start frame interrupted partial message; discarding"
                    );
                }
                self.partial = Some(PartialMessage::new(usize::from(total)));
                &frame[MARKER_LEN + LENGTH_LEN..]
            }
            Some(MarkerKind::Continuation) => {
                if self.partial.is_none() {
                    return Err(FrameError::UnexpectedContinuation);
                }
                &frame[MARKER_LEN..]
            }
            None => return Err(FrameError::InvalidMarker { found: marker }),
        };

        self.append(body)
    }

    fn append(&mut self, body: &[u8]) -> Result<Option<Bytes>, FrameError> {
        let Some(partial) = self.partial.as_mut() else {
            return Err(FrameError::UnexpectedContinuation);
        };
        partial.frames += 1;

        let missing = partial.missing();
        if body.len() < missing {
            partial.buffer.extend_from_slice(body);
            return Ok(None);
        }

        let (data, trailer) = body.split_at(missing);
        partial.buffer.extend_from_slice(data);
        if trailer.len() < CHECKSUM_LEN {
            return Err(FrameError::Truncated {
                received: partial.buffer.len() + trailer.len(),
                expected: Some(partial.expected + CHECKSUM_LEN),
            });
        }
        if trailer.len() > CHECKSUM_LEN {
            return Err(FrameError::TrailingBytes {
                extra: trailer.len() - CHECKSUM_LEN,
            });
        }

        let Some(partial) = self.partial.take() else {
            return Err(FrameError::UnexpectedContinuation);
        };
        let expected = read_network_u16_at(trailer, 0).ok_or(FrameError::Truncated {
            received: partial.buffer.len() + trailer.len(),
            expected: Some(partial.expected + CHECKSUM_LEN),
        })?;
        let actual = crc16(&partial.buffer);
        if expected != actual {
            return Err(FrameError::Corrupt { expected, actual });
        }

        trace!(
            len = partial.buffer.len(),
            frames = partial.frames,
            "reassembled message"
        );
        Ok(Some(partial.buffer.freeze()))
    }

    /// Describe why the frames fed so far do not form a message.
    pub(crate) fn truncation(&self) -> FrameError {
        match &self.partial {
            Some(partial) => FrameError::Truncated {
                received: partial.buffer.len(),
                expected: Some(partial.expected + CHECKSUM_LEN),
            },
            None => FrameError::Truncated {
                received: 0,
                expected: None,
            },
        }
    }
}

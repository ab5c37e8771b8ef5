//! Inbound half of a command runner: frames in, messages out.

use tracing::{debug, trace};

use crate::{
    connection::FrameReader,
    error::Result,
    frame::FrameDecoder,
    message::{Message, deserialize_nmgr_req},
    metrics::{self, Direction},
};

/// Reassembles frames from a [`FrameReader`] into [`Message`]s.
#[derive(Debug)]
pub struct MessageReader<R> {
    inner: R,
    decoder: FrameDecoder,
}

impl<R: FrameReader> MessageReader<R> {
    /// Wrap a frame source.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::new(),
        }
    }

    /// Read frames until one complete message has been reassembled.
    ///
    /// A codec failure discards only the message being reassembled; the next
    /// call starts afresh.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Protocol`](crate::RunnerError::Protocol) if the
    /// frames or the header are malformed and
    /// [`RunnerError::Transport`](crate::RunnerError::Transport) if the
    /// connection failed.
    pub async fn read_req(&mut self) -> Result<Message> {
        loop {
            let frame = match self.inner.read_frame().await {
                Ok(frame) => frame,
                Err(error) => {
                    self.decoder.reset();
                    return Err(error.into());
                }
            };
            metrics::inc_frames(Direction::Inbound);
            trace!(len = frame.len(), "received frame");

            let Some(bytes) = self.decoder.push(frame.as_bytes())? else {
                continue;
            };
            let message = deserialize_nmgr_req(&bytes)?;
            debug!(
                op = ?message.op(),
                group = %message.group(),
                seq = message.seq(),
                id = message.id(),
                len = message.payload().len(),
                "received message"
            );
            return Ok(message);
        }
    }

    /// Borrow the decoder, e.g. to inspect a partially reassembled message.
    #[must_use]
    pub fn decoder(&self) -> &FrameDecoder { &self.decoder }

    /// Recover the wrapped frame source.
    pub fn into_inner(self) -> R { self.inner }
}

//! Outbound half of a command runner: messages in, frames out.

use tracing::debug;

use crate::{
    connection::FrameWriter,
    error::Result,
    frame::FrameEncoder,
    message::{EncodeError, Message, serialize_request},
    metrics::{self, Direction},
};

/// Serializes [`Message`]s and writes their frames to a [`FrameWriter`].
#[derive(Debug)]
pub struct MessageWriter<W> {
    inner: W,
    encoder: FrameEncoder,
}

impl<W: FrameWriter> MessageWriter<W> {
    /// Wrap a frame sink, splitting messages with `encoder`.
    #[must_use]
    pub fn new(inner: W, encoder: FrameEncoder) -> Self { Self { inner, encoder } }

    /// Encode `message` and write every frame, in order.
    ///
    /// Nothing is written if encoding fails.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Protocol`](crate::RunnerError::Protocol) if the
    /// message cannot be encoded and
    /// [`RunnerError::Transport`](crate::RunnerError::Transport) if a frame
    /// could not be written. In the latter case a prefix of the frames may
    /// already have reached the peer.
    pub async fn write_req(&mut self, message: &Message) -> Result<()> {
        let bytes = serialize_request(message)?;
        let frames = self.encoder.encode(&bytes).map_err(EncodeError::Frame)?;
        let count = frames.len();
        for frame in frames {
            self.inner.write_frame(frame).await?;
            metrics::inc_frames(Direction::Outbound);
        }
        debug!(
            op = ?message.op(),
            group = %message.group(),
            seq = message.seq(),
            id = message.id(),
            len = bytes.len(),
            frames = count,
            "sent message"
        );
        Ok(())
    }

    /// Encoder used to split outbound messages.
    #[must_use]
    pub const fn encoder(&self) -> &FrameEncoder { &self.encoder }

    /// Recover the wrapped frame sink.
    pub fn into_inner(self) -> W { self.inner }
}

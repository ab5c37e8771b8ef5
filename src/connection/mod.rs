//! Boundary between the protocol core and physical transports.
//!
//! A transport only has to move whole frames: [`FrameReader`] yields one
//! frame at a time and [`FrameWriter`] accepts one frame at a time. A
//! [`Connection`] reports the largest frame it can carry and splits into the
//! two halves so the read path and the write path can run on separate tasks.
//!
//! Two transport-agnostic implementations are provided: [`MemoryConnection`]
//! joins two endpoints in-process, and [`StreamConnection`] carries frames
//! over any byte stream with a 16-bit length prefix.

use async_trait::async_trait;

use crate::{error::TransportError, frame::Frame};

mod memory;
mod stream;

pub use memory::{MemoryConnection, MemoryReader, MemoryWriter};
pub use stream::{StreamConnection, StreamReader, StreamWriter};

/// Source of inbound frames.
#[async_trait]
pub trait FrameReader: Send {
    /// Wait for the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once the peer has gone away, or
    /// another [`TransportError`] if the transport faulted.
    async fn read_frame(&mut self) -> Result<Frame, TransportError>;
}

/// Sink for outbound frames.
#[async_trait]
pub trait FrameWriter: Send {
    /// Transmit one frame in full.
    ///
    /// Implementations must never truncate: a frame the transport cannot carry
    /// is rejected with [`TransportError::FrameTooLarge`].
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the frame could not be sent.
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError>;
}

#[async_trait]
impl<R: FrameReader + ?Sized> FrameReader for Box<R> {
    async fn read_frame(&mut self) -> Result<Frame, TransportError> { (**self).read_frame().await }
}

#[async_trait]
impl<W: FrameWriter + ?Sized> FrameWriter for Box<W> {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        (**self).write_frame(frame).await
    }
}

/// A bidirectional frame transport to one device.
pub trait Connection: Send {
    /// Read half produced by [`Connection::split`].
    type Reader: FrameReader + 'static;
    /// Write half produced by [`Connection::split`].
    type Writer: FrameWriter + 'static;

    /// Largest frame, in bytes, the transport carries.
    fn max_frame_len(&self) -> usize;

    /// Separate the connection into independently owned halves.
    fn split(self) -> (Self::Reader, Self::Writer);
}

//! In-process connection joining two endpoints through channels.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use super::{Connection, FrameReader, FrameWriter};
use crate::{error::TransportError, frame::Frame};

const DEFAULT_BUFFER: usize = 64;

/// One endpoint of an in-memory frame link.
///
/// Frames written to one endpoint are read, unchanged and in order, from the
/// other. Dropping an endpoint closes the link for its peer.
///
/// # Examples
///
/// ```
/// use mgmtwire::{
///     connection::{Connection, FrameReader, FrameWriter, MemoryConnection},
///     frame::Frame,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (host, device) = MemoryConnection::pair(32);
/// let (_host_reader, mut host_writer) = host.split();
/// let (mut device_reader, _device_writer) = device.split();
///
/// host_writer
///     .write_frame(Frame::from_received(b"ping"))
///     .await
///     .expect("write");
/// let frame = device_reader.read_frame().await.expect("read");
/// assert_eq!(frame.as_bytes(), b"ping");
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryConnection {
    mtu: usize,
    tx: mpsc::Sender<Bytes>,
    rx: mpsc::Receiver<Bytes>,
}

impl MemoryConnection {
    /// Create two connected endpoints that carry frames of up to `mtu` bytes.
    #[must_use]
    pub fn pair(mtu: usize) -> (Self, Self) { Self::pair_with_buffer(mtu, DEFAULT_BUFFER) }

    /// Create two connected endpoints with `buffer` frames of queueing in each
    /// direction.
    ///
    /// # Panics
    ///
    /// Panics if `buffer` is zero.
    #[must_use]
    pub fn pair_with_buffer(mtu: usize, buffer: usize) -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel(buffer);
        let (b_tx, a_rx) = mpsc::channel(buffer);
        (
            Self {
                mtu,
                tx: a_tx,
                rx: a_rx,
            },
            Self {
                mtu,
                tx: b_tx,
                rx: b_rx,
            },
        )
    }
}

impl Connection for MemoryConnection {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    fn max_frame_len(&self) -> usize { self.mtu }

    fn split(self) -> (Self::Reader, Self::Writer) {
        (
            MemoryReader { rx: self.rx },
            MemoryWriter {
                tx: self.tx,
                mtu: self.mtu,
            },
        )
    }
}

/// Read half of a [`MemoryConnection`].
#[derive(Debug)]
pub struct MemoryReader {
    rx: mpsc::Receiver<Bytes>,
}

#[async_trait]
impl FrameReader for MemoryReader {
    async fn read_frame(&mut self) -> Result<Frame, TransportError> {
        self.rx
            .recv()
            .await
            .map(Frame::from_received)
            .ok_or(TransportError::Closed)
    }
}

/// Write half of a [`MemoryConnection`].
#[derive(Debug)]
pub struct MemoryWriter {
    tx: mpsc::Sender<Bytes>,
    mtu: usize,
}

#[async_trait]
impl FrameWriter for MemoryWriter {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        if frame.len() > self.mtu {
            return Err(TransportError::FrameTooLarge {
                len: frame.len(),
                max: self.mtu,
            });
        }
        self.tx
            .send(frame.freeze())
            .await
            .map_err(|_| TransportError::Closed)
    }
}

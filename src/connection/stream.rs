//! Frame transport over a byte stream.
//!
//! Byte streams have no frame boundaries of their own, so each frame is
//! preceded by a 16-bit big-endian length using
//! [`LengthDelimitedCodec`](tokio_util::codec::LengthDelimitedCodec).

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use super::{Connection, FrameReader, FrameWriter};
use crate::{error::TransportError, frame::Frame};

const LENGTH_FIELD_LEN: usize = 2;

/// Connection carrying length-prefixed frames over `T`.
#[derive(Debug)]
pub struct StreamConnection<T> {
    io: T,
    mtu: usize,
}

impl<T> StreamConnection<T>
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wrap `io`, accepting frames of up to `mtu` bytes.
    ///
    /// The length prefix is 16 bits wide, so `mtu` is capped at `u16::MAX`.
    #[must_use]
    pub fn new(io: T, mtu: usize) -> Self {
        Self {
            io,
            mtu: mtu.min(usize::from(u16::MAX)),
        }
    }

    fn codec(&self) -> LengthDelimitedCodec {
        LengthDelimitedCodec::builder()
            .length_field_length(LENGTH_FIELD_LEN)
            .max_frame_length(self.mtu)
            .new_codec()
    }
}

impl<T> Connection for StreamConnection<T>
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    type Reader = StreamReader<ReadHalf<T>>;
    type Writer = StreamWriter<WriteHalf<T>>;

    fn max_frame_len(&self) -> usize { self.mtu }

    fn split(self) -> (Self::Reader, Self::Writer) {
        let codec = self.codec();
        let (read, write) = tokio::io::split(self.io);
        (
            StreamReader {
                inner: FramedRead::new(read, codec.clone()),
            },
            StreamWriter {
                inner: FramedWrite::new(write, codec),
                mtu: self.mtu,
            },
        )
    }
}

/// Read half of a [`StreamConnection`].
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: FramedRead<R, LengthDelimitedCodec>,
}

#[async_trait]
impl<R> FrameReader for StreamReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn read_frame(&mut self) -> Result<Frame, TransportError> {
        match self.inner.next().await {
            Some(Ok(bytes)) => Ok(Frame::from_received(bytes)),
            Some(Err(error)) => Err(error.into()),
            None => Err(TransportError::Closed),
        }
    }
}

/// Write half of a [`StreamConnection`].
#[derive(Debug)]
pub struct StreamWriter<W> {
    inner: FramedWrite<W, LengthDelimitedCodec>,
    mtu: usize,
}

#[async_trait]
impl<W> FrameWriter for StreamWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        if frame.len() > self.mtu {
            return Err(TransportError::FrameTooLarge {
                len: frame.len(),
                max: self.mtu,
            });
        }
        self.inner.send(frame.freeze()).await.map_err(TransportError::from)
    }
}

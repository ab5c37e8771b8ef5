//! Request/response plumbing over a single connection.

use super::{MessageReader, MessageWriter, RunnerConfig};
use crate::{connection::Connection, error::Result, message::Message};

/// Owns both halves of a [`Connection`] and moves whole messages over it.
///
/// `CmdRunner` performs no correlation: callers that need request/response
/// matching and timeouts should use [`Session`](super::Session) instead.
///
/// # Examples
///
/// ```
/// use mgmtwire::{
///     connection::MemoryConnection,
///     message::{Group, Message, Op},
///     runner::CmdRunner,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mgmtwire::Result<()> {
/// let (host, device) = MemoryConnection::pair(64);
/// let mut host = CmdRunner::new(host)?;
/// let mut device = CmdRunner::new(device)?;
///
/// let request = Message::new(Op::Read, Group::IMAGE, 0, &b"state"[..]).with_seq(5);
/// host.write_req(&request).await?;
/// assert_eq!(device.read_req().await?, request);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CmdRunner<C: Connection> {
    reader: MessageReader<C::Reader>,
    writer: MessageWriter<C::Writer>,
}

impl<C: Connection> CmdRunner<C> {
    /// Build a runner with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Protocol`](crate::RunnerError::Protocol) if the
    /// connection's maximum frame length leaves no room for message bytes.
    pub fn new(conn: C) -> Result<Self> { Self::with_config(conn, RunnerConfig::default()) }

    /// Build a runner with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Protocol`](crate::RunnerError::Protocol) if no
    /// chunk capacity is configured and the connection's maximum frame length
    /// leaves no room for message bytes, or if the configured chunk capacity
    /// plus the frame envelope exceeds that length.
    pub fn with_config(conn: C, config: RunnerConfig) -> Result<Self> {
        let encoder = config.encoder_for(conn.max_frame_len())?;
        let (reader, writer) = conn.split();
        Ok(Self {
            reader: MessageReader::new(reader),
            writer: MessageWriter::new(writer, encoder),
        })
    }

    /// Read the next complete message.
    ///
    /// # Errors
    ///
    /// See [`MessageReader::read_req`].
    pub async fn read_req(&mut self) -> Result<Message> { self.reader.read_req().await }

    /// Write one message.
    ///
    /// # Errors
    ///
    /// See [`MessageWriter::write_req`].
    pub async fn write_req(&mut self, message: &Message) -> Result<()> {
        self.writer.write_req(message).await
    }

    /// Separate the runner so reading and writing can happen on different
    /// tasks.
    pub fn into_parts(self) -> (MessageReader<C::Reader>, MessageWriter<C::Writer>) {
        (self.reader, self.writer)
    }
}

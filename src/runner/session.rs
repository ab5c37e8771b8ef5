//! Concurrent, correlated request/response exchanges over one connection.

use std::{fmt, sync::Arc};

use tokio::{sync::Mutex, task::JoinHandle, time::timeout_at};
use tracing::{debug, error, warn};

use super::{MessageReader, MessageWriter, PendingTable, Registration, Resolution, RunnerConfig};
use crate::{
    connection::{Connection, FrameReader, FrameWriter},
    correlation::Correlatable,
    error::{Result, RunnerError},
    message::Message,
    metrics,
};

type SharedWriter = Mutex<MessageWriter<Box<dyn FrameWriter>>>;

/// A running session with one device.
///
/// Any number of tasks may call [`Session::request`] concurrently. Each
/// request is assigned a fresh sequence number, written atomically with
/// respect to other requests, and completed by the response carrying the same
/// group and sequence number. A background task reads the connection and
/// routes responses; responses that match nothing are logged and dropped.
///
/// Dropping the session stops the background task.
///
/// # Examples
///
/// ```
/// use mgmtwire::{
///     connection::MemoryConnection,
///     message::{Group, Message, Op},
///     runner::{CmdRunner, RunnerConfig, Session},
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mgmtwire::Result<()> {
/// let (host, device) = MemoryConnection::pair(128);
/// let session = Session::spawn(host, RunnerConfig::default())?;
///
/// tokio::spawn(async move {
///     let mut device = CmdRunner::new(device)?;
///     let request = device.read_req().await?;
///     device.write_req(&Message::response_to(&request, &b"ok"[..])).await
/// });
///
/// let request = Message::new(Op::Read, Group::STATS, 0, &b"list"[..]);
/// let response = session.request(request).await?;
/// assert_eq!(response.op(), Op::ReadRsp);
/// assert_eq!(response.payload(), b"ok");
/// # Ok(())
/// # }
/// ```
pub struct Session {
    table: Arc<PendingTable>,
    writer: SharedWriter,
    config: RunnerConfig,
    reader_task: JoinHandle<()>,
}

impl Session {
    /// Split `conn` and start routing its inbound messages.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Protocol`] if no chunk capacity is configured
    /// and the connection's maximum frame length leaves no room for message
    /// bytes, or if a configured chunk capacity would produce frames longer
    /// than the connection carries.
    pub fn spawn<C: Connection>(conn: C, config: RunnerConfig) -> Result<Self> {
        let encoder = config.encoder_for(conn.max_frame_len())?;
        let (reader, writer) = conn.split();
        let table = Arc::new(PendingTable::new());
        let reader_task = tokio::spawn(route_responses(
            MessageReader::new(reader),
            Arc::clone(&table),
        ));
        let writer: Box<dyn FrameWriter> = Box::new(writer);
        debug!(
            chunk_capacity = encoder.chunk_capacity().get(),
            timeout = ?config.response_timeout_value(),
            "session started"
        );
        Ok(Self {
            table,
            writer: Mutex::new(MessageWriter::new(writer, encoder)),
            config,
            reader_task,
        })
    }

    /// Send `request` and wait for its correlated response.
    ///
    /// The sequence number already on `request` is replaced. The response
    /// timeout runs from the moment the exchange is registered, so time spent
    /// waiting for other writers counts against it.
    ///
    /// # Errors
    ///
    /// - [`RunnerError::Protocol`] if the request cannot be encoded; the
    ///   session stays usable.
    /// - [`RunnerError::Timeout`] if no response arrived in time; the sequence
    ///   number is released and the request may be retried.
    /// - [`RunnerError::Transport`] if the connection failed; every pending
    ///   exchange fails the same way and the session is closed.
    /// - [`RunnerError::SequenceExhausted`] if 256 exchanges are already
    ///   pending.
    /// - [`RunnerError::SessionClosed`] after [`Session::shutdown`] or a
    ///   transport failure.
    pub async fn request(&self, mut request: Message) -> Result<Message> {
        let mut registration = self.table.register(request.group())?;
        let key = registration.key();
        request.set_seq(key.seq());

        let deadline = registration.submitted_at() + self.config.response_timeout_value();
        match timeout_at(deadline, self.exchange(&request, &mut registration)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => self.expire(registration).await,
        }
    }

    async fn exchange(&self, request: &Message, registration: &mut Registration) -> Result<Message> {
        let seq = registration.key().seq();
        let written = {
            let mut writer = self.writer.lock().await;
            writer.write_req(request).await
        };
        match written {
            Ok(()) => {
                self.table.mark_sent(seq);
            }
            Err(RunnerError::Transport(transport)) => {
                error!(key = %registration.key(), error = %transport, "write failed; closing session");
                self.table.abandon(seq);
                self.table.fail_all(&transport);
                return Err(RunnerError::Transport(transport));
            }
            Err(other) => {
                self.table.abandon(seq);
                return Err(other);
            }
        }
        registration.outcome().await
    }

    async fn expire(&self, mut registration: Registration) -> Result<Message> {
        let key = registration.key();
        if self.table.retire(key.seq()) {
            let after = self.config.response_timeout_value();
            warn!(key = %key, ?after, "exchange timed out");
            return Err(RunnerError::Timeout { key, after });
        }
        // Another path already removed the exchange from the table, so its
        // outcome is sent or about to be sent.
        registration.outcome().await
    }

    /// Number of exchanges awaiting a response.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.table.len() }

    /// Whether the session refuses new requests.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.table.is_closed() }

    /// Configuration the session was started with.
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig { &self.config }

    /// Stop routing responses and fail every pending exchange with
    /// [`RunnerError::SessionClosed`].
    pub fn shutdown(&self) {
        let failed = self.table.close();
        self.reader_task.abort();
        debug!(failed, "session shut down");
    }
}

impl Drop for Session {
    fn drop(&mut self) { self.reader_task.abort(); }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("pending", &self.table.len())
            .field("closed", &self.table.is_closed())
            .finish_non_exhaustive()
    }
}

async fn route_responses<R: FrameReader>(mut reader: MessageReader<R>, table: Arc<PendingTable>) {
    loop {
        match reader.read_req().await {
            Ok(message) => dispatch(&table, message),
            Err(RunnerError::Transport(transport)) => {
                let failed = table.fail_all(&transport);
                if failed == 0 {
                    debug!(error = %transport, "connection ended");
                } else {
                    error!(error = %transport, failed, "connection failed");
                }
                return;
            }
            Err(other) => {
                metrics::inc_decode_errors();
                warn!(error = %other, "discarding malformed inbound message");
            }
        }
    }
}

fn dispatch(table: &PendingTable, message: Message) {
    if !message.op().is_response() {
        metrics::inc_stray_responses();
        warn!(
            key = %message.correlation_key(),
            op = ?message.op(),
            "dropping unsolicited request from device"
        );
        return;
    }
    if let Resolution::Unmatched(key) = table.resolve(message) {
        metrics::inc_stray_responses();
        warn!(key = %key, "dropping response with no pending exchange");
    }
}

//! Simulated device answering management requests.

use mgmtwire::{CmdRunner, Connection, Message};
use tokio::task::JoinHandle;

/// How the simulated device answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceMode {
    /// Reply to every request with its own payload.
    #[default]
    Echo,
    /// Reply with the sequence number off by one.
    WrongSeq,
    /// Read requests but never reply.
    Silent,
    /// Close the connection after reading the first request.
    Hangup,
}

/// Handle to a running simulated device.
#[derive(Debug)]
pub struct DeviceHandle {
    task: JoinHandle<Vec<Message>>,
}

impl DeviceHandle {
    /// Wait for the host to disconnect and return every request the device
    /// received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the device task panicked or was aborted.
    pub async fn join(self) -> Vec<Message> { self.task.await.expect("device task failed") }

    /// Stop the device immediately.
    pub fn abort(&self) { self.task.abort(); }
}

/// Run a simulated device on `conn` until the host disconnects.
///
/// Malformed requests are skipped; the device keeps serving.
///
/// # Panics
///
/// The device task panics if `conn` cannot carry any message bytes or a
/// reply cannot be written for a reason other than the host going away.
pub fn spawn_device<C>(conn: C, mode: DeviceMode) -> DeviceHandle
where
    C: Connection + 'static,
{
    let task = tokio::spawn(async move {
        let mut runner = CmdRunner::new(conn).expect("device connection has no room for data");
        let mut received = Vec::new();
        loop {
            let request = match runner.read_req().await {
                Ok(request) => request,
                Err(err) if err.is_fatal() => break,
                Err(_) => continue,
            };
            received.push(request.clone());

            let reply = match mode {
                DeviceMode::Echo => Message::response_to(&request, request.payload().to_vec()),
                DeviceMode::WrongSeq => {
                    Message::response_to(&request, request.payload().to_vec())
                        .with_seq(request.seq().wrapping_add(1))
                }
                DeviceMode::Silent => continue,
                DeviceMode::Hangup => break,
            };
            match runner.write_req(&reply).await {
                Ok(()) => {}
                Err(err) if err.is_fatal() => break,
                Err(err) => panic!("device failed to reply: {err}"),
            }
        }
        received
    });
    DeviceHandle { task }
}

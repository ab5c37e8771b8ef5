//! Device-side helpers shared by runner tests.

use tokio::task::JoinHandle;

use crate::{
    connection::MemoryConnection,
    error::Result,
    message::{Group, Message, Op},
    runner::CmdRunner,
};

/// MTU leaving 20 message bytes per frame.
pub(super) const SMALL_MTU: usize = 26;

/// Answer every request on `device` with a response echoing its payload,
/// until the host goes away.
pub(super) fn spawn_echo(device: MemoryConnection) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let mut device = CmdRunner::new(device)?;
        loop {
            let request = match device.read_req().await {
                Ok(request) => request,
                Err(error) if error.is_fatal() => return Ok(()),
                Err(error) => return Err(error),
            };
            let response = Message::response_to(&request, request.payload().to_vec());
            device.write_req(&response).await?;
        }
    })
}

pub(super) fn read_request(payload: &'static [u8]) -> Message {
    Message::new(Op::Read, Group::IMAGE, 0, payload)
}

//! Moving messages over a [`Connection`](crate::connection::Connection).
//!
//! [`CmdRunner`] is the thin layer: it encodes outbound messages into frames
//! and reassembles inbound frames into messages, one at a time. [`Session`]
//! builds correlation on top of it, matching each response to its request by
//! group and sequence number and enforcing a per-exchange timeout.

mod cmd_runner;
mod config;
mod exchange;
mod pending;
mod reader;
mod session;
mod writer;

pub use cmd_runner::CmdRunner;
pub use config::RunnerConfig;
pub use exchange::ExchangeState;
pub use pending::{PendingTable, Registration, Resolution};
pub use reader::MessageReader;
pub use session::Session;
pub use writer::MessageWriter;

#[cfg(test)]
mod tests;

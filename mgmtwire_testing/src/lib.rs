//! Utilities for exercising `mgmtwire` sessions against a simulated device
//! during tests.
//!
//! The simulated device runs on the far end of a
//! [`MemoryConnection`](mgmtwire::MemoryConnection) and answers requests
//! according to a [`DeviceMode`].
//!
//! ```rust
//! use mgmtwire::{Group, MemoryConnection, Message, Op, RunnerConfig, Session};
//! use mgmtwire_testing::{DeviceMode, spawn_device};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (host, device) = MemoryConnection::pair(64);
//! let device = spawn_device(device, DeviceMode::Echo);
//! let session = Session::spawn(host, RunnerConfig::default()).expect("session");
//!
//! let request = Message::new(Op::Read, Group::DEFAULT, 0, &b"hi"[..]);
//! let response = session.request(request).await.expect("response");
//! assert_eq!(response.payload(), b"hi");
//!
//! drop(session);
//! assert_eq!(device.join().await.len(), 1);
//! # }
//! ```

mod device;
mod logging;
mod recorder;

pub use device::{DeviceHandle, DeviceMode, spawn_device};
pub use logging::{LoggerHandle, logger};
pub use recorder::{Counters, debugging_recorder};

#![doc(html_root_url = "https://docs.rs/mgmtwire/latest")]
//! Public API for the `mgmtwire` library.
//!
//! This crate implements the host side of a compact device-management
//! protocol: a frame codec that splits messages to fit small transports, a
//! message codec for the fixed 8-byte header, a transport-agnostic
//! connection abstraction, and a command runner that correlates requests
//! with responses and enforces timeouts.
//!
//! The library never installs a `tracing` subscriber or a `metrics`
//! recorder; embedding applications provide their own.

pub mod byte_order;
pub mod checksum;
pub mod connection;
pub mod correlation;
pub mod error;
pub mod frame;
pub mod message;
pub mod metrics;
pub mod runner;

pub use connection::{Connection, FrameReader, FrameWriter, MemoryConnection, StreamConnection};
pub use correlation::{Correlatable, CorrelationKey};
/// Result type alias re-exported for convenience when driving a runner.
pub use error::Result;
pub use error::{ProtocolError, RunnerError, TransportError};
pub use frame::{Frame, FrameDecoder, FrameEncoder, FrameError};
pub use message::{
    DecodeError,
    EncodeError,
    Group,
    Header,
    Message,
    Op,
    Payload,
    deserialize_nmgr_req,
    serialize_request,
};
pub use metrics::{
    DECODE_ERRORS_TOTAL,
    Direction,
    EXCHANGES_TOTAL,
    FRAMES_TOTAL,
    STRAY_RESPONSES_TOTAL,
};
pub use runner::{CmdRunner, ExchangeState, RunnerConfig, Session};

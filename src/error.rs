//! Canonical error and result types for the crate.
//!
//! Errors fall into three scopes. Codec failures ([`ProtocolError`]) affect a
//! single message and leave the session usable. Transport failures
//! ([`TransportError`]) are global to the connection and fail every pending
//! exchange. Timeouts affect one exchange and may be retried by the caller
//! with a fresh sequence number.

use std::{io, sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    correlation::CorrelationKey,
    frame::FrameError,
    message::{DecodeError, EncodeError},
};

/// A message could not be framed, serialized or decoded.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame reassembly failed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    /// The outbound message could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// The inbound message could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// The connection itself failed.
///
/// Cloneable so one failure can be reported to every pending exchange.
#[derive(Clone, Debug, Error)]
pub enum TransportError {
    /// The peer or the local side closed the connection.
    #[error("connection closed")]
    Closed,
    /// A frame was larger than the transport accepts; nothing was sent.
    #[error("frame of {len} bytes exceeds transport limit of {max}")]
    FrameTooLarge {
        /// Length of the rejected frame.
        len: usize,
        /// Largest frame the transport accepts.
        max: usize,
    },
    /// The underlying I/O failed.
    #[error("transport I/O error: {0}")]
    Io(Arc<io::Error>),
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self { Self::Io(Arc::new(error)) }
}

/// Errors returned by the command runner and session.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A message could not be encoded or an inbound message could not be
    /// decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// The connection failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// No correlated response arrived before the deadline.
    #[error("no response for {key} within {after:?}")]
    Timeout {
        /// Exchange that timed out.
        key: CorrelationKey,
        /// Deadline that elapsed.
        after: Duration,
    },
    /// Every sequence number is held by a pending exchange.
    #[error("all sequence numbers are awaiting responses")]
    SequenceExhausted,
    /// The session was shut down or lost its connection.
    #[error("session closed")]
    SessionClosed,
}

impl RunnerError {
    /// Whether the session must be re-established after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool { matches!(self, Self::Transport(_) | Self::SessionClosed) }

    /// Whether this error reports an expired deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool { matches!(self, Self::Timeout { .. }) }
}

impl From<FrameError> for RunnerError {
    fn from(error: FrameError) -> Self { Self::Protocol(error.into()) }
}

impl From<EncodeError> for RunnerError {
    fn from(error: EncodeError) -> Self { Self::Protocol(error.into()) }
}

impl From<DecodeError> for RunnerError {
    fn from(error: DecodeError) -> Self { Self::Protocol(error.into()) }
}

/// Canonical result alias used by `mgmtwire` public APIs.
pub type Result<T> = std::result::Result<T, RunnerError>;

#[cfg(test)]
mod tests {
    use std::{io, time::Duration};

    use rstest::rstest;

    use super::{ProtocolError, RunnerError, TransportError};
    use crate::{correlation::CorrelationKey, frame::FrameError, message::Group};

    #[rstest]
    #[case(RunnerError::Transport(TransportError::Closed), true)]
    #[case(RunnerError::SessionClosed, true)]
    #[case(RunnerError::SequenceExhausted, false)]
    #[case(RunnerError::from(FrameError::ZeroCapacity), false)]
    fn fatal_classification(#[case] error: RunnerError, #[case] fatal: bool) {
        assert_eq!(error.is_fatal(), fatal);
    }

    #[test]
    fn codec_errors_are_wrapped_as_protocol() {
        let error = RunnerError::from(FrameError::Corrupt {
            expected: 1,
            actual: 2,
        });
        assert!(matches!(
            error,
            RunnerError::Protocol(ProtocolError::Frame(FrameError::Corrupt { .. }))
        ));
    }

    #[test]
    fn timeout_display_names_exchange() {
        let error = RunnerError::Timeout {
            key: CorrelationKey::new(Group::IMAGE, 3),
            after: Duration::from_millis(250),
        };
        assert!(error.is_timeout());
        assert_eq!(error.to_string(), "no response for image#3 within 250ms");
    }

    #[test]
    fn io_errors_convert_to_shared_transport_errors() {
        let error = TransportError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let copy = error.clone();
        assert_eq!(copy.to_string(), "transport I/O error: gone");
    }
}

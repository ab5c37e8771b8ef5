//! Metric helpers for `mgmtwire`.
//!
//! This module defines metric names and small helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! every helper compiles to nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::runner::ExchangeState;

/// Name of the counter tracking frames moved over a connection.
pub const FRAMES_TOTAL: &str = "mgmtwire_frames_total";
/// Name of the counter tracking finished exchanges by outcome.
pub const EXCHANGES_TOTAL: &str = "mgmtwire_exchanges_total";
/// Name of the counter tracking responses that matched no pending exchange.
pub const STRAY_RESPONSES_TOTAL: &str = "mgmtwire_stray_responses_total";
/// Name of the counter tracking inbound messages discarded as malformed.
pub const DECODE_ERRORS_TOTAL: &str = "mgmtwire_decode_errors_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    /// Frames received from the device.
    Inbound,
    /// Frames sent to the device.
    Outbound,
}

impl Direction {
    #[cfg_attr(
        not(feature = "metrics"),
        expect(dead_code, reason = "labels are only read when metrics are recorded")
    )]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record one frame for the given direction.
pub fn inc_frames(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_TOTAL, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record an exchange reaching the terminal `state`.
pub fn inc_exchanges(state: ExchangeState) {
    #[cfg(feature = "metrics")]
    counter!(EXCHANGES_TOTAL, "outcome" => state.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = state;
}

/// Record a response dropped because nothing was waiting for it.
pub fn inc_stray_responses() {
    #[cfg(feature = "metrics")]
    counter!(STRAY_RESPONSES_TOTAL).increment(1);
}

/// Record an inbound message discarded because it could not be decoded.
pub fn inc_decode_errors() {
    #[cfg(feature = "metrics")]
    counter!(DECODE_ERRORS_TOTAL).increment(1);
}

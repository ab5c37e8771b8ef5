//! Lifecycle of a single request/response exchange.

use std::fmt;

/// State of one exchange.
///
/// ```text
/// Idle ─▶ AwaitingSend ─▶ AwaitingResponse ─▶ Resolved
///              │                 ├──────────▶ TimedOut
///              │                 └──────────▶ Failed
///              └─▶ Resolved | TimedOut | Failed
/// ```
///
/// A response may resolve an exchange that is still `AwaitingSend`: the
/// exchange is registered before its first frame is written, so a fast device
/// can answer before the writer records completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeState {
    /// Created but not yet registered.
    Idle,
    /// Registered; frames are being written.
    AwaitingSend,
    /// Every frame was written; waiting for the correlated response.
    AwaitingResponse,
    /// The correlated response arrived.
    Resolved,
    /// The deadline elapsed first.
    TimedOut,
    /// The transport failed or the session closed first.
    Failed,
}

impl ExchangeState {
    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::TimedOut | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        match self {
            Self::Idle => matches!(next, Self::AwaitingSend),
            Self::AwaitingSend => matches!(
                next,
                Self::AwaitingResponse | Self::Resolved | Self::TimedOut | Self::Failed
            ),
            Self::AwaitingResponse => next.is_terminal(),
            Self::Resolved | Self::TimedOut | Self::Failed => false,
        }
    }

    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingSend => "awaiting_send",
            Self::AwaitingResponse => "awaiting_response",
            Self::Resolved => "resolved",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

//! Configuration for command runners and sessions.

use std::{num::NonZeroUsize, time::Duration};

use crate::frame::{FRAME_OVERHEAD, FrameEncoder, FrameError};

const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by [`CmdRunner`](super::CmdRunner) and
/// [`Session`](super::Session).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use mgmtwire::runner::RunnerConfig;
///
/// let config = RunnerConfig::default().response_timeout(Duration::from_secs(2));
/// assert_eq!(config.response_timeout_value(), Duration::from_secs(2));
/// assert_eq!(config.chunk_capacity_value(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunnerConfig {
    response_timeout: Duration,
    chunk_capacity: Option<NonZeroUsize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            chunk_capacity: None,
        }
    }
}

impl RunnerConfig {
    /// Set how long a session waits for a correlated response, measured from
    /// submission.
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Fix the number of message bytes carried per frame.
    ///
    /// By default the capacity is derived from the connection's maximum frame
    /// length minus the frame envelope. An explicit capacity must leave room
    /// for that envelope within the connection's maximum frame length.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZeroUsize;
    ///
    /// use mgmtwire::runner::RunnerConfig;
    ///
    /// let chunk = NonZeroUsize::new(20).expect("non-zero");
    /// let config = RunnerConfig::default().chunk_capacity(chunk);
    /// assert_eq!(config.chunk_capacity_value(), Some(chunk));
    /// ```
    #[must_use]
    pub fn chunk_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.chunk_capacity = Some(capacity);
        self
    }

    /// Return the configured response timeout.
    #[must_use]
    pub const fn response_timeout_value(&self) -> Duration { self.response_timeout }

    /// Return the explicit chunk capacity, if one was set.
    #[must_use]
    pub const fn chunk_capacity_value(&self) -> Option<NonZeroUsize> { self.chunk_capacity }

    pub(crate) fn encoder_for(&self, max_frame_len: usize) -> Result<FrameEncoder, FrameError> {
        match self.chunk_capacity {
            Some(capacity) if capacity.get().saturating_add(FRAME_OVERHEAD) > max_frame_len => {
                Err(FrameError::ChunkExceedsMtu {
                    capacity: capacity.get(),
                    max_frame_len,
                })
            }
            Some(capacity) => Ok(FrameEncoder::new(capacity)),
            None => FrameEncoder::for_mtu(max_frame_len),
        }
    }
}

//! Sequence-number allocation and the table of outstanding exchanges.
//!
//! [`PendingTable`] is shared by the task submitting requests and the task
//! reading responses. A single mutex guards both the sequence counter and the
//! exchange map, so a sequence number is never handed out twice while in use
//! and a response can never race a timeout for the same exchange.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::{sync::oneshot, time::Instant};
use tracing::{debug, trace};

use super::ExchangeState;
use crate::{
    correlation::{Correlatable, CorrelationKey},
    error::{Result, RunnerError, TransportError},
    message::{Group, Message},
    metrics,
};

/// Number of distinct sequence numbers the header can carry.
const SEQ_SPACE: usize = 1 << u8::BITS;

type Outcome = Result<Message>;

#[derive(Debug)]
struct PendingExchange {
    key: CorrelationKey,
    submitted_at: Instant,
    state: ExchangeState,
    outcome: oneshot::Sender<Outcome>,
}

impl PendingExchange {
    fn advance(&mut self, next: ExchangeState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal exchange transition {} -> {next}",
            self.state
        );
        self.state = next;
    }

    /// Move to the terminal `state` and hand back the completion channel.
    fn finish(mut self, state: ExchangeState) -> oneshot::Sender<Outcome> {
        self.advance(state);
        metrics::inc_exchanges(state);
        trace!(
            key = %self.key,
            state = %state,
            elapsed = ?self.submitted_at.elapsed(),
            "exchange finished"
        );
        self.outcome
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u8,
    exchanges: HashMap<u8, PendingExchange>,
    closed: bool,
}

impl Inner {
    fn drain(&mut self) -> impl Iterator<Item = PendingExchange> + '_ {
        self.exchanges.drain().map(|(_, exchange)| exchange)
    }
}

/// Handle returned to the submitter of a newly registered exchange.
#[derive(Debug)]
pub struct Registration {
    key: CorrelationKey,
    submitted_at: Instant,
    outcome: oneshot::Receiver<Outcome>,
}

impl Registration {
    /// Key the response must carry.
    #[must_use]
    pub const fn key(&self) -> CorrelationKey { self.key }

    /// When the exchange was registered.
    #[must_use]
    pub const fn submitted_at(&self) -> Instant { self.submitted_at }

    /// Wait for the exchange to be resolved or failed.
    ///
    /// # Errors
    ///
    /// Returns the error the exchange failed with, or
    /// [`RunnerError::SessionClosed`] if the table was dropped.
    pub async fn outcome(&mut self) -> Outcome {
        (&mut self.outcome)
            .await
            .unwrap_or(Err(RunnerError::SessionClosed))
    }

    /// Take an outcome that was delivered without waiting.
    #[cfg(test)]
    pub(crate) fn try_outcome(&mut self) -> Option<Outcome> { self.outcome.try_recv().ok() }
}

/// Result of offering an inbound response to the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The response completed a pending exchange.
    Delivered,
    /// No pending exchange carries this key.
    Unmatched(CorrelationKey),
}

/// Shared registry of exchanges awaiting responses on one connection.
#[derive(Debug, Default)]
pub struct PendingTable {
    inner: Mutex<Inner>,
}

impl PendingTable {
    /// Create an empty table whose first sequence number is zero.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty table whose first sequence number is `seq`.
    #[must_use]
    pub fn with_starting_seq(seq: u8) -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_seq: seq,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new exchange for `group` and assign its sequence number.
    ///
    /// Sequence numbers increase monotonically and wrap after 255, skipping
    /// any number still held by a pending exchange.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::SessionClosed`] once the table is closed and
    /// [`RunnerError::SequenceExhausted`] when all 256 sequence numbers are
    /// pending.
    pub fn register(&self, group: Group) -> Result<Registration> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(RunnerError::SessionClosed);
        }
        if inner.exchanges.len() >= SEQ_SPACE {
            return Err(RunnerError::SequenceExhausted);
        }

        let mut seq = inner.next_seq;
        while inner.exchanges.contains_key(&seq) {
            seq = seq.wrapping_add(1);
        }
        inner.next_seq = seq.wrapping_add(1);

        let key = CorrelationKey::new(group, seq);
        let submitted_at = Instant::now();
        let (tx, rx) = oneshot::channel();
        let mut exchange = PendingExchange {
            key,
            submitted_at,
            state: ExchangeState::Idle,
            outcome: tx,
        };
        exchange.advance(ExchangeState::AwaitingSend);
        inner.exchanges.insert(seq, exchange);
        trace!(key = %key, pending = inner.exchanges.len(), "registered exchange");

        Ok(Registration {
            key,
            submitted_at,
            outcome: rx,
        })
    }

    /// Record that every frame of the request for `seq` was written.
    ///
    /// Returns `false` if the exchange already finished.
    pub fn mark_sent(&self, seq: u8) -> bool {
        let mut inner = self.lock();
        match inner.exchanges.get_mut(&seq) {
            Some(exchange) if exchange.state == ExchangeState::AwaitingSend => {
                exchange.advance(ExchangeState::AwaitingResponse);
                true
            }
            _ => false,
        }
    }

    /// Offer an inbound response to the exchange sharing its key.
    pub fn resolve(&self, response: Message) -> Resolution {
        let key = response.correlation_key();
        let mut inner = self.lock();
        let matches = inner
            .exchanges
            .get(&key.seq())
            .is_some_and(|exchange| exchange.key == key);
        if !matches {
            return Resolution::Unmatched(key);
        }
        if let Some(exchange) = inner.exchanges.remove(&key.seq()) {
            deliver(exchange.finish(ExchangeState::Resolved), Ok(response));
        }
        Resolution::Delivered
    }

    /// Retire the exchange for `seq` because its deadline elapsed.
    ///
    /// Returns `true` if this call timed the exchange out, and `false` if it
    /// had already finished. The sequence number is free for reuse afterwards.
    pub fn retire(&self, seq: u8) -> bool {
        let Some(exchange) = self.lock().exchanges.remove(&seq) else {
            return false;
        };
        let error = RunnerError::Timeout {
            key: exchange.key,
            after: exchange.submitted_at.elapsed(),
        };
        deliver(exchange.finish(ExchangeState::TimedOut), Err(error));
        true
    }

    /// Remove the exchange for `seq` after its request could not be sent.
    ///
    /// The submitter already holds the error, so nothing is delivered.
    /// Returns `true` if an exchange was removed.
    pub fn abandon(&self, seq: u8) -> bool {
        let Some(exchange) = self.lock().exchanges.remove(&seq) else {
            return false;
        };
        drop(exchange.finish(ExchangeState::Failed));
        true
    }

    /// Fail every pending exchange with `error` and refuse new registrations.
    ///
    /// Returns the number of exchanges failed.
    pub fn fail_all(&self, error: &TransportError) -> usize {
        self.close_with(|| RunnerError::Transport(error.clone()))
    }

    /// Fail every pending exchange with [`RunnerError::SessionClosed`] and
    /// refuse new registrations.
    ///
    /// Returns the number of exchanges failed.
    pub fn close(&self) -> usize { self.close_with(|| RunnerError::SessionClosed) }

    fn close_with(&self, error: impl Fn() -> RunnerError) -> usize {
        let mut inner = self.lock();
        inner.closed = true;
        let mut count = 0;
        for exchange in inner.drain() {
            deliver(exchange.finish(ExchangeState::Failed), Err(error()));
            count += 1;
        }
        drop(inner);
        if count > 0 {
            debug!(failed = count, "failed pending exchanges");
        }
        count
    }

    /// Whether the table refuses new registrations.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.lock().closed }

    /// Number of exchanges awaiting completion.
    #[must_use]
    pub fn len(&self) -> usize { self.lock().exchanges.len() }

    /// Whether no exchange is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.lock().exchanges.is_empty() }

    /// Current state of the exchange holding `seq`, if any.
    #[must_use]
    pub fn state(&self, seq: u8) -> Option<ExchangeState> {
        self.lock().exchanges.get(&seq).map(|exchange| exchange.state)
    }
}

fn deliver(outcome: oneshot::Sender<Outcome>, value: Outcome) {
    // The submitter may already have given up; nothing is waiting then.
    let _ = outcome.send(value);
}

#[cfg(test)]
mod tests;

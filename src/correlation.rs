//! Correlation of responses with the requests that caused them.
//!
//! A response answers the request that shares its group and sequence number.
//! [`Correlatable`] abstracts over message types that carry those two fields
//! so the pending-exchange table can stamp and inspect them without knowing
//! the concrete representation.

use derive_more::Display;

use crate::message::Group;

/// Key pairing a response with its request.
///
/// Displayed as `group#seq`, e.g. `image#5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[display("{group}#{seq}")]
pub struct CorrelationKey {
    group: Group,
    seq: u8,
}

impl CorrelationKey {
    /// Create a key from its parts.
    #[must_use]
    pub const fn new(group: Group, seq: u8) -> Self { Self { group, seq } }

    /// Command family.
    #[must_use]
    pub const fn group(&self) -> Group { self.group }

    /// Sequence number.
    #[must_use]
    pub const fn seq(&self) -> u8 { self.seq }
}

/// Access and stamp correlation data on messages.
pub trait Correlatable {
    /// Return the key identifying the exchange this message belongs to.
    fn correlation_key(&self) -> CorrelationKey;

    /// Stamp a host-assigned sequence number.
    fn set_seq(&mut self, seq: u8);
}

#[cfg(test)]
mod tests {
    use super::{Correlatable, CorrelationKey};
    use crate::message::{Group, Message, Op};

    #[test]
    fn response_shares_key_with_request() {
        let request = Message::new(Op::Write, Group::IMAGE, 1, vec![1, 2]).with_seq(9);
        let response = Message::response_to(&request, vec![0]);
        assert_eq!(request.correlation_key(), response.correlation_key());
        assert_eq!(response.correlation_key(), CorrelationKey::new(Group::IMAGE, 9));
    }

    #[test]
    fn stamping_changes_only_sequence() {
        let mut message = Message::new(Op::Read, Group::STATS, 3, Vec::new());
        message.set_seq(200);
        assert_eq!(message.seq(), 200);
        assert_eq!(message.group(), Group::STATS);
        assert_eq!(message.id(), 3);
    }

    #[test]
    fn key_displays_group_and_sequence() {
        let key = CorrelationKey::new(Group::per_user(6).expect("in range"), 42);
        assert_eq!(key.to_string(), "per-user(70)#42");
        assert_eq!(CorrelationKey::new(Group::DEFAULT, 5).to_string(), "default#5");
    }
}

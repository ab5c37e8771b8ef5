//! Tests for sequence allocation and exchange bookkeeping.

use rstest::rstest;

use super::PendingTable;
use crate::{
    correlation::CorrelationKey,
    error::{RunnerError, TransportError},
    message::{Group, Message, Op},
    runner::{ExchangeState, Resolution},
};

fn response(group: Group, seq: u8) -> Message {
    Message::new(Op::ReadRsp, group, 0, &b"rsp"[..]).with_seq(seq)
}

#[test]
fn sequence_numbers_increase_from_start() {
    let table = PendingTable::new();
    let seqs: Vec<u8> = (0..3)
        .map(|_| table.register(Group::IMAGE).expect("register").key().seq())
        .collect();
    assert_eq!(seqs, [0, 1, 2]);
    assert_eq!(table.len(), 3);
}

#[rstest]
#[case(255, [255, 0])]
#[case(254, [254, 255])]
fn sequence_numbers_wrap_after_255(#[case] start: u8, #[case] expected: [u8; 2]) {
    let table = PendingTable::with_starting_seq(start);
    let first = table.register(Group::DEFAULT).expect("first");
    let second = table.register(Group::DEFAULT).expect("second");
    assert_eq!([first.key().seq(), second.key().seq()], expected);
}

#[test]
fn wrapped_allocation_skips_numbers_in_use() {
    let table = PendingTable::with_starting_seq(254);
    let mut held: Vec<_> = (0..256)
        .map(|_| table.register(Group::STATS).expect("register"))
        .collect();
    assert_eq!(held[0].key().seq(), 254);
    assert_eq!(held[2].key().seq(), 0);
    assert_eq!(held[255].key().seq(), 253);

    // 254 and 255 are still pending, so the counter wraps past them.
    let freed = held.remove(2);
    assert!(table.retire(freed.key().seq()));
    let next = table.register(Group::STATS).expect("register after retire");
    assert_eq!(next.key().seq(), 0);
}

#[test]
fn exhausted_table_refuses_until_a_number_frees() {
    let table = PendingTable::new();
    let registrations: Vec<_> = (0..256)
        .map(|_| table.register(Group::FS).expect("register"))
        .collect();
    assert!(matches!(
        table.register(Group::FS),
        Err(RunnerError::SequenceExhausted)
    ));

    assert!(table.retire(registrations[7].key().seq()));
    let next = table.register(Group::FS).expect("register after retire");
    assert_eq!(next.key().seq(), 7);
}

#[tokio::test]
async fn matching_response_resolves_exchange() {
    let table = PendingTable::new();
    let mut registration = table.register(Group::CONFIG).expect("register");
    let seq = registration.key().seq();
    assert!(table.mark_sent(seq));
    assert_eq!(table.state(seq), Some(ExchangeState::AwaitingResponse));

    let rsp = response(Group::CONFIG, seq);
    assert_eq!(table.resolve(rsp.clone()), Resolution::Delivered);
    assert_eq!(registration.outcome().await.expect("resolved"), rsp);
    assert!(table.is_empty());
}

#[test]
fn response_may_resolve_before_send_is_recorded() {
    let table = PendingTable::new();
    let mut registration = table.register(Group::LOGS).expect("register");
    let seq = registration.key().seq();

    assert_eq!(
        table.resolve(response(Group::LOGS, seq)),
        Resolution::Delivered
    );
    assert!(!table.mark_sent(seq));
    assert!(registration.try_outcome().is_some());
}

#[rstest]
#[case(Group::IMAGE, 9)]
#[case(Group::STATS, 0)]
fn mismatched_response_is_unmatched(#[case] group: Group, #[case] seq: u8) {
    let table = PendingTable::new();
    let registration = table.register(Group::IMAGE).expect("register");
    assert_eq!(registration.key().seq(), 0);

    assert_eq!(
        table.resolve(response(group, seq)),
        Resolution::Unmatched(CorrelationKey::new(group, seq))
    );
    assert_eq!(table.len(), 1, "pending exchange must survive a stray response");
}

#[test]
fn retirement_happens_exactly_once() {
    let table = PendingTable::new();
    let mut registration = table.register(Group::SHELL).expect("register");
    let seq = registration.key().seq();

    assert!(table.retire(seq));
    assert!(!table.retire(seq));
    assert_eq!(
        table.resolve(response(Group::SHELL, seq)),
        Resolution::Unmatched(registration.key())
    );
    assert!(matches!(
        registration.try_outcome(),
        Some(Err(RunnerError::Timeout { .. }))
    ));
}

#[test]
fn resolved_exchange_cannot_be_retired() {
    let table = PendingTable::new();
    let registration = table.register(Group::RUN).expect("register");
    let seq = registration.key().seq();
    table.resolve(response(Group::RUN, seq));
    assert!(!table.retire(seq));
}

#[tokio::test]
async fn fail_all_reports_transport_error_and_closes() {
    let table = PendingTable::new();
    let mut first = table.register(Group::IMAGE).expect("first");
    let mut second = table.register(Group::CRASH).expect("second");

    assert_eq!(table.fail_all(&TransportError::Closed), 2);
    assert!(table.is_closed());
    assert!(table.is_empty());
    for registration in [&mut first, &mut second] {
        assert!(matches!(
            registration.outcome().await,
            Err(RunnerError::Transport(TransportError::Closed))
        ));
    }
    assert!(matches!(
        table.register(Group::IMAGE),
        Err(RunnerError::SessionClosed)
    ));
}

#[test]
fn late_retirement_after_transport_failure_sees_transport_error() {
    let table = PendingTable::new();
    let mut registration = table.register(Group::LOGS).expect("register");

    table.fail_all(&TransportError::Closed);
    assert!(!table.retire(registration.key().seq()));
    // The failure is already delivered by the time the table is observable.
    assert!(matches!(
        registration.try_outcome(),
        Some(Err(RunnerError::Transport(TransportError::Closed)))
    ));
}

#[tokio::test]
async fn close_fails_pending_with_session_closed() {
    let table = PendingTable::new();
    let mut registration = table.register(Group::SPLIT).expect("register");
    assert_eq!(table.close(), 1);
    assert!(matches!(
        registration.outcome().await,
        Err(RunnerError::SessionClosed)
    ));
}

#[test]
fn abandon_releases_without_delivering() {
    let table = PendingTable::new();
    let mut registration = table.register(Group::IMAGE).expect("register");
    let seq = registration.key().seq();
    assert!(table.abandon(seq));
    assert!(!table.abandon(seq));
    assert!(registration.try_outcome().is_none());
    assert!(!table.is_closed());
}

//! Unit tests for frame encoding and reassembly.

use std::num::NonZeroUsize;

use proptest::prelude::*;
use rstest::rstest;

use super::{
    CHECKSUM_LEN,
    CONTINUATION_MARKER,
    FRAME_OVERHEAD,
    Frame,
    FrameDecoder,
    FrameEncoder,
    FrameError,
    START_MARKER,
    decode,
    encode,
};

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| u8::try_from(i % 251).expect("fits in u8")).collect()
}

#[test]
fn empty_message_produces_single_frame() {
    let frames = encode(&[], 8).expect("encode empty");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].as_bytes(), &[0x06, 0x09, 0x00, 0x00, 0x00, 0x00]);
    assert!(decode(&frames).expect("decode empty").is_empty());
}

#[test]
fn exact_capacity_does_not_emit_empty_continuation() {
    let message = sample(16);
    let frames = encode(&message, 16).expect("encode");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].len(), 16 + FRAME_OVERHEAD);
    assert_eq!(decode(&frames).expect("decode"), message);
}

#[test]
fn forty_five_bytes_over_twenty_byte_chunks() {
    let message = sample(45);
    let frames = encode(&message, 20).expect("encode");

    assert_eq!(frames.len(), 3);
    assert!(frames[0].as_bytes().starts_with(&START_MARKER));
    assert!(frames[1].as_bytes().starts_with(&CONTINUATION_MARKER));
    assert!(frames[2].as_bytes().starts_with(&CONTINUATION_MARKER));
    // Envelope: marker + length on the first, marker on the rest, checksum last.
    assert_eq!(frames[0].len(), 2 + 2 + 20);
    assert_eq!(frames[1].len(), 2 + 20);
    assert_eq!(frames[2].len(), 2 + 5 + CHECKSUM_LEN);

    assert_eq!(decode(&frames).expect("decode"), message);
}

#[rstest]
#[case(1, 1)]
#[case(19, 1)]
#[case(20, 1)]
#[case(21, 2)]
#[case(40, 2)]
#[case(41, 3)]
fn frame_count_is_ceiling_of_len_over_capacity(#[case] len: usize, #[case] expected: usize) {
    let frames = encode(&sample(len), 20).expect("encode");
    assert_eq!(frames.len(), expected);
}

#[test]
fn zero_capacity_is_rejected() {
    assert_eq!(encode(&[1, 2, 3], 0), Err(FrameError::ZeroCapacity));
}

#[test]
fn oversized_message_is_rejected() {
    let message = vec![0_u8; usize::from(u16::MAX) + 1];
    assert_eq!(
        encode(&message, 512),
        Err(FrameError::TooLarge {
            len: message.len(),
            max: usize::from(u16::MAX),
        })
    );
}

#[test]
fn mtu_constructor_reserves_envelope_bytes() {
    let encoder = FrameEncoder::for_mtu(20).expect("mtu leaves room");
    assert_eq!(encoder.chunk_capacity().get(), 20 - FRAME_OVERHEAD);
    for frame in encoder.encode(&sample(100)).expect("encode") {
        assert!(frame.len() <= 20);
    }
    assert_eq!(FrameEncoder::for_mtu(FRAME_OVERHEAD), Err(FrameError::ZeroCapacity));
}

#[test]
fn missing_terminal_frame_is_truncated() {
    let frames = encode(&sample(45), 20).expect("encode");
    assert_eq!(
        decode(&frames[..2]),
        Err(FrameError::Truncated {
            received: 40,
            expected: Some(45 + CHECKSUM_LEN),
        })
    );
}

#[test]
fn no_frames_is_truncated() {
    let frames: Vec<Frame> = Vec::new();
    assert_eq!(
        decode(&frames),
        Err(FrameError::Truncated {
            received: 0,
            expected: None,
        })
    );
}

#[test]
fn flipped_payload_bit_is_corrupt() {
    let frames = encode(b"{op: echo}", 64).expect("encode");
    let mut bytes = frames[0].as_bytes().to_vec();
    bytes[5] ^= 0x40;
    assert!(matches!(
        decode([bytes]),
        Err(FrameError::Corrupt { .. })
    ));
}

#[test]
fn unknown_marker_is_rejected() {
    assert_eq!(
        decode([[0xde, 0xad, 0x00, 0x00]]),
        Err(FrameError::InvalidMarker { found: [0xde, 0xad] })
    );
}

#[test]
fn continuation_without_start_is_rejected() {
    let mut decoder = FrameDecoder::new();
    assert_eq!(
        decoder.push(&[0x04, 0x14, 1, 2]),
        Err(FrameError::UnexpectedContinuation)
    );
}

#[rstest]
#[case(&[], 2)]
#[case(&[0x06], 2)]
#[case(&[0x06, 0x09, 0x00], 4)]
fn short_frames_report_incomplete_header(#[case] frame: &[u8], #[case] need: usize) {
    let mut decoder = FrameDecoder::new();
    assert_eq!(
        decoder.push(frame),
        Err(FrameError::IncompleteHeader {
            have: frame.len(),
            need,
        })
    );
}

#[test]
fn bytes_after_checksum_are_rejected() {
    let frames = encode(b"hi", 8).expect("encode");
    let mut bytes = frames[0].as_bytes().to_vec();
    bytes.push(0xff);
    assert_eq!(decode([bytes]), Err(FrameError::TrailingBytes { extra: 1 }));
}

#[test]
fn frames_after_completion_are_rejected() {
    let mut frames = encode(b"hi", 8).expect("encode");
    frames.extend(encode(b"again", 8).expect("encode"));
    assert_eq!(decode(&frames), Err(FrameError::TrailingFrames { extra: 1 }));
}

#[test]
fn decoder_recovers_after_error() {
    let mut decoder = FrameDecoder::new();
    let good = encode(b"after", 3).expect("encode");

    assert!(decoder.push(&[0xba, 0xd0]).is_err());
    assert!(!decoder.in_progress());
    assert_eq!(decoder.push(good[0].as_bytes()), Ok(None));
    assert!(decoder.in_progress());
    assert_eq!(
        decoder.push(good[1].as_bytes()).expect("complete").as_deref(),
        Some(&b"after"[..])
    );
}

#[test]
fn new_start_frame_discards_partial_message() {
    let mut decoder = FrameDecoder::new();
    let abandoned = encode(&sample(30), 10).expect("encode");
    let fresh = encode(b"fresh", 10).expect("encode");

    assert_eq!(decoder.push(abandoned[0].as_bytes()), Ok(None));
    assert_eq!(decoder.buffered_len(), 10);
    let message = decoder
        .push(fresh[0].as_bytes())
        .expect("decode")
        .expect("single frame completes");
    assert_eq!(&message[..], b"fresh");
}

#[test]
fn frame_rejects_writes_past_capacity() {
    let mut frame = Frame::with_capacity(3);
    frame.extend(&[1, 2]).expect("fits");
    assert_eq!(
        frame.extend(&[3, 4]),
        Err(FrameError::CapacityExceeded {
            capacity: 3,
            attempted: 4,
        })
    );
    assert_eq!(frame.as_bytes(), &[1, 2]);
    frame.extend(&[3]).expect("fills exactly");
    assert_eq!(frame.remaining(), 0);
}

#[test]
fn received_frame_capacity_matches_length() {
    let frame = Frame::from_received([1_u8, 2, 3]);
    assert_eq!(frame.capacity(), 3);
    assert_eq!(frame.len(), 3);
    assert_eq!(frame.freeze().as_ref(), &[1, 2, 3]);
}

proptest! {
    #[test]
    fn round_trip_within_one_frame(
        message in proptest::collection::vec(any::<u8>(), 0..=64),
        slack in 0_usize..32,
    ) {
        let capacity = message.len().max(1) + slack;
        let frames = encode(&message, capacity).expect("encode");
        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(decode(&frames).expect("decode"), message);
    }

    #[test]
    fn round_trip_across_frames(
        message in proptest::collection::vec(any::<u8>(), 1..=600),
        capacity in 1_usize..64,
    ) {
        let encoder = FrameEncoder::new(NonZeroUsize::new(capacity).expect("non-zero"));
        let frames = encoder.encode(&message).expect("encode");
        prop_assert_eq!(frames.len(), message.len().div_ceil(capacity));
        for frame in &frames {
            prop_assert!(frame.len() <= capacity + FRAME_OVERHEAD);
        }
        prop_assert_eq!(decode(&frames).expect("decode"), message);
    }
}

//! Tests for `CmdRunner` framing over an in-memory link.

use std::num::NonZeroUsize;

use rstest::rstest;

use super::helpers::{SMALL_MTU, read_request};
use crate::{
    connection::{Connection, FrameReader, FrameWriter, MemoryConnection},
    error::{ProtocolError, RunnerError},
    frame::{Frame, FrameError, encode},
    message::{EncodeError, Group, Message, Op},
    runner::{CmdRunner, RunnerConfig},
};

#[tokio::test]
async fn message_round_trips_between_runners() {
    let (host, device) = MemoryConnection::pair(64);
    let mut host = CmdRunner::new(host).expect("host runner");
    let mut device = CmdRunner::new(device).expect("device runner");

    let request = Message::new(Op::Write, Group::CONFIG, 3, &b"key=value"[..]).with_seq(5);
    host.write_req(&request).await.expect("write request");
    assert_eq!(device.read_req().await.expect("read request"), request);

    let response = Message::response_to(&request, &b""[..]);
    device.write_req(&response).await.expect("write response");
    let received = host.read_req().await.expect("read response");
    assert_eq!(received.op(), Op::WriteRsp);
    assert_eq!(received.seq(), 5);
    assert!(received.payload().is_empty());
}

#[tokio::test]
async fn forty_five_byte_message_spans_three_frames() {
    let (host, device) = MemoryConnection::pair(SMALL_MTU);
    let mut host = CmdRunner::new(host).expect("host runner");
    let (mut raw, _device_writer) = device.split();

    // 8-byte header plus 37 payload bytes.
    let request = read_request(&[0x5a; 37]);
    host.write_req(&request).await.expect("write");

    let mut frames = Vec::new();
    for _ in 0..3 {
        frames.push(raw.read_frame().await.expect("frame"));
    }
    let lens: Vec<usize> = frames.iter().map(Frame::len).collect();
    assert_eq!(lens, [24, 22, 9]);
    assert_eq!(&frames[0].as_bytes()[..4], &[0x06, 0x09, 0x00, 0x2d]);
    assert_eq!(&frames[1].as_bytes()[..2], &[0x04, 0x14]);
    assert_eq!(&frames[2].as_bytes()[..2], &[0x04, 0x14]);

    let bytes = crate::frame::decode(frames.iter().map(Frame::as_bytes)).expect("decode");
    assert_eq!(bytes, request.serialize().expect("serialize"));
}

#[tokio::test]
async fn configured_chunk_capacity_overrides_mtu() {
    let (host, device) = MemoryConnection::pair(512);
    let chunk = NonZeroUsize::new(4).expect("non-zero");
    let mut host =
        CmdRunner::with_config(host, RunnerConfig::default().chunk_capacity(chunk)).expect("host");
    let (mut raw, _device_writer) = device.split();

    host.write_req(&read_request(b"")).await.expect("write");
    // Eight header bytes in chunks of four.
    assert_eq!(raw.read_frame().await.expect("first").len(), 8);
    assert_eq!(raw.read_frame().await.expect("second").len(), 8);
}

#[test]
fn mtu_without_room_for_data_is_rejected() {
    let (host, _device) = MemoryConnection::pair(6);
    let err = CmdRunner::new(host).expect_err("mtu of six carries nothing");
    assert!(matches!(
        err,
        RunnerError::Protocol(ProtocolError::Frame(FrameError::ZeroCapacity))
    ));
}

#[rstest]
#[case(20, true)]
#[case(21, false)]
fn configured_chunk_capacity_must_fit_mtu(#[case] chunk: usize, #[case] accepted: bool) {
    let (host, _device) = MemoryConnection::pair(SMALL_MTU);
    let chunk = NonZeroUsize::new(chunk).expect("non-zero");
    let result = CmdRunner::with_config(host, RunnerConfig::default().chunk_capacity(chunk));
    match result {
        Ok(_) => assert!(accepted, "chunk of {chunk} should not fit"),
        Err(err) => {
            assert!(!accepted, "chunk of {chunk} should fit: {err}");
            assert!(matches!(
                err,
                RunnerError::Protocol(ProtocolError::Frame(FrameError::ChunkExceedsMtu {
                    capacity: 21,
                    max_frame_len: SMALL_MTU,
                }))
            ));
        }
    }
}

#[tokio::test]
async fn oversized_message_is_rejected_before_writing() {
    let (host, device) = MemoryConnection::pair(SMALL_MTU);
    let mut host = CmdRunner::new(host).expect("host runner");
    let (mut raw, _device_writer) = device.split();

    let request = Message::new(Op::Write, Group::FS, 0, vec![0_u8; 70_000]);
    let err = host.write_req(&request).await.expect_err("too large");
    assert!(matches!(
        err,
        RunnerError::Protocol(ProtocolError::Encode(EncodeError::Overflow { .. }))
    ));

    drop(host);
    assert!(raw.read_frame().await.is_err(), "no frame should have been sent");
}

#[tokio::test]
async fn corrupt_message_is_reported_and_reader_recovers() {
    let (host, device) = MemoryConnection::pair(64);
    let mut host = CmdRunner::new(host).expect("host runner");
    let (_device_reader, mut raw) = device.split();

    let good = read_request(b"fine").with_seq(2);
    let mut corrupt = encode(&good.serialize().expect("serialize"), 64).expect("encode");
    let mut bytes = corrupt.remove(0).as_bytes().to_vec();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    raw.write_frame(Frame::from_received(bytes)).await.expect("corrupt");
    for frame in encode(&good.serialize().expect("serialize"), 64).expect("encode") {
        raw.write_frame(frame).await.expect("good");
    }

    let err = host.read_req().await.expect_err("checksum mismatch");
    assert!(matches!(
        err,
        RunnerError::Protocol(ProtocolError::Frame(FrameError::Corrupt { .. }))
    ));
    assert_eq!(host.read_req().await.expect("recovered"), good);
}

#[tokio::test]
async fn closed_link_is_a_transport_error() {
    let (host, device) = MemoryConnection::pair(64);
    let mut host = CmdRunner::new(host).expect("host runner");
    drop(device);

    let err = host.read_req().await.expect_err("closed");
    assert!(err.is_fatal());
}

#[tokio::test]
async fn split_parts_work_independently() {
    let (host, device) = MemoryConnection::pair(64);
    let (mut reader, mut writer) = CmdRunner::new(host).expect("host").into_parts();
    let echo = super::helpers::spawn_echo(device);

    let request = read_request(b"parts").with_seq(9);
    writer.write_req(&request).await.expect("write");
    let response = reader.read_req().await.expect("read");
    assert_eq!(response.seq(), 9);
    assert_eq!(response.payload(), b"parts");

    drop((reader, writer));
    echo.await.expect("join").expect("echo device");
}

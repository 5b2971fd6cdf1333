mod common;

use common::{rxm_rawx, ubx_frame, RawxMeas};
use proptest::prelude::*;
use rand::RngExt;
use ubx_decoder::{encode_frame, gen_ubx, DecodeError, DecodeEvent, Parser, UbxDecoder};

static FULL_ACK_ACK_PACK: [u8; 10] = [0xb5, 0x62, 0x5, 0x1, 0x2, 0x0, 0x6, 0x1, 0xf, 0x38];

fn push_all(parser: &mut Parser, bytes: &[u8]) -> Vec<Result<Vec<u8>, DecodeError>> {
    let mut ret = vec![];
    for b in bytes {
        if let Some(res) = parser.push(*b) {
            ret.push(res.map(|frame| frame.as_bytes().to_vec()));
        }
    }
    ret
}

/// Every non-empty event produced by reading `data` a frame at a time
fn read_all(decoder: &mut UbxDecoder, data: &[u8]) -> Vec<Result<DecodeEvent, DecodeError>> {
    let mut reader = data;
    let mut ret = vec![];
    loop {
        match decoder.feed_frame(&mut reader) {
            Err(DecodeError::EndOfStream) => break,
            Ok(DecodeEvent::NoMessage) => {},
            res => ret.push(res),
        }
    }
    ret
}

fn garbage_without_sync(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    (0..len).map(|_| rng.random_range(0..0xb5u8)).collect()
}

#[test]
fn test_parse_empty_input() {
    let mut parser = Parser::default();
    assert!(parser.is_buffer_empty());
    assert_eq!(push_all(&mut parser, &[]), vec![]);
    assert_eq!(parser.read_frame(&mut &[0u8; 0][..]), Err(DecodeError::EndOfStream));
}

#[test]
fn test_decoder_ack_ack_byte_by_byte() {
    let mut decoder = UbxDecoder::new();
    for b in FULL_ACK_ACK_PACK.iter() {
        assert_eq!(decoder.feed(*b), Ok(DecodeEvent::NoMessage));
    }
    assert!(decoder.parser().is_buffer_empty());
    assert!(decoder.observations().is_empty());
}

#[test]
fn test_decoder_bad_checksum_then_recovers() {
    let mut decoder = UbxDecoder::new();
    let mut bad_pack = FULL_ACK_ACK_PACK;
    bad_pack[bad_pack.len() - 3] = 5;

    let mut results = vec![];
    for b in bad_pack.iter().chain(FULL_ACK_ACK_PACK.iter()) {
        match decoder.feed(*b) {
            Ok(DecodeEvent::NoMessage) => {},
            res => results.push(res),
        }
    }
    assert_eq!(
        results,
        vec![Err(DecodeError::InvalidChecksum {
            expect: 0x380f,
            got: 0x3c13
        })]
    );

    let frame = rxm_rawx(2200, 1000.0, &[RawxMeas::gps(5)]);
    let (last, head) = frame.split_last().unwrap();
    for b in head {
        assert_eq!(decoder.feed(*b), Ok(DecodeEvent::NoMessage));
    }
    assert!(matches!(
        decoder.feed(*last),
        Ok(DecodeEvent::ObservationsReady { count: 1, .. })
    ));
}

#[test]
fn test_decoder_too_long_frame() {
    let mut decoder = UbxDecoder::new();
    let header = [0xb5, 0x62, 0x02, 0x15, 0xff, 0xff];
    let results: Vec<_> = header.iter().map(|b| decoder.feed(*b)).collect();
    assert_eq!(
        results.last(),
        Some(&Err(DecodeError::FrameTooLong { len: 0xffff + 8 }))
    );
    assert!(results[..5].iter().all(|r| r == &Ok(DecodeEvent::NoMessage)));
    assert!(decoder.parser().is_buffer_empty());
}

#[test]
fn test_feed_frame_over_file() {
    let mut data = ubx_frame(0x01, 0x07, &[0u8; 92]);
    data.extend_from_slice(&rxm_rawx(2200, 1000.0, &[RawxMeas::gps(1), RawxMeas::gps(2)]));
    data.extend_from_slice(&FULL_ACK_ACK_PACK);
    data.extend_from_slice(&rxm_rawx(2200, 1001.0, &[RawxMeas::gps(1)]));

    let mut decoder = UbxDecoder::new();
    let events = read_all(&mut decoder, &data);
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        Ok(DecodeEvent::ObservationsReady { count: 2, .. })
    ));
    assert!(matches!(
        events[1],
        Ok(DecodeEvent::ObservationsReady { count: 1, .. })
    ));
    assert_eq!(decoder.observations().len(), 1);
}

#[test]
fn test_feed_frame_truncated_tail() {
    let frame = rxm_rawx(2200, 1000.0, &[RawxMeas::gps(1)]);
    let mut decoder = UbxDecoder::new();
    let mut reader = &frame[..frame.len() - 4];
    assert_eq!(
        decoder.feed_frame(&mut reader),
        Err(DecodeError::EndOfStream)
    );
    assert!(decoder.observations().is_empty());
}

#[test]
fn test_resync_after_random_garbage() {
    let frame = rxm_rawx(2200, 1000.0, &[RawxMeas::gps(7)]);
    let mut data = garbage_without_sync(300);
    data.extend_from_slice(&frame);
    data.extend_from_slice(&garbage_without_sync(17));
    data.extend_from_slice(&FULL_ACK_ACK_PACK);

    let mut parser = Parser::new();
    assert_eq!(
        push_all(&mut parser, &data),
        vec![Ok(frame.clone()), Ok(FULL_ACK_ACK_PACK.to_vec())]
    );

    let mut decoder = UbxDecoder::new();
    let events = read_all(&mut decoder, &data);
    assert_eq!(events.len(), 1);
    assert_eq!(decoder.observations().len(), 1);
}

#[test]
fn test_false_sync_inside_garbage() {
    // Stray sync pair announcing a one byte payload
    let mut data = vec![0xb5, 0x62, 0x0a, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00];
    data.extend_from_slice(&FULL_ACK_ACK_PACK);
    let mut parser = Parser::new();
    let frames = push_all(&mut parser, &data);
    assert_eq!(frames.len(), 2);
    assert!(matches!(frames[0], Err(DecodeError::InvalidChecksum { .. })));
    assert_eq!(frames[1], Ok(FULL_ACK_ACK_PACK.to_vec()));
}

#[test]
fn test_generated_cfg_frames_parse() {
    let mut parser = Parser::new();
    for cmd in [
        "CFG-MSG 2 21 0 1",
        "CFG-RATE 200 1 1",
        "CFG-PRT 1 0 0 2256 115200 1 1",
        "CFG-TMODE 1 100 200 300",
    ] {
        let frame = gen_ubx(cmd);
        assert!(!frame.is_empty(), "{cmd}");
        let results = push_all(&mut parser, &frame);
        assert_eq!(results, vec![Ok(frame.clone())], "{cmd}");
        assert_eq!(frame[2], 0x06);
    }

    let mut decoder = UbxDecoder::new();
    let events: Vec<_> = gen_ubx("CFG-MSG 2 21 0 1")
        .into_iter()
        .map(|b| decoder.feed(b))
        .collect();
    assert!(events.iter().all(|r| r == &Ok(DecodeEvent::NoMessage)));
}

#[test]
fn test_encode_frame_agrees_with_reference_checksum() {
    let payload: Vec<u8> = (0..=255u8).collect();
    assert_eq!(
        encode_frame(0x02, 0x13, &payload),
        ubx_frame(0x02, 0x13, &payload)
    );
}

fn rawx_meas_strategy() -> impl Strategy<Value = RawxMeas> {
    (1..=32u8, 0..=0xffffu16, 0..=60u8, 0..=15u8).prop_map(|(sv_id, lock_time, cno, cp_stdev)| {
        RawxMeas {
            lock_time,
            cno,
            cp_stdev,
            ..RawxMeas::gps(sv_id)
        }
    })
}

/// A short session of RXM-RAWX frames with strictly increasing receiver time
fn rawx_session_strategy() -> impl Strategy<Value = Vec<u8>> {
    (
        1..=3000u16,
        prop::collection::vec(prop::collection::vec(rawx_meas_strategy(), 0..=8), 1..=6),
    )
        .prop_map(|(week, epochs)| {
            let mut data = vec![];
            for (i, meas) in epochs.iter().enumerate() {
                data.extend_from_slice(&rxm_rawx(week, 100.0 + i as f64, meas));
            }
            data
        })
}

fn payload_strategy() -> impl Strategy<Value = (u8, u8, Vec<u8>)> {
    (
        any::<u8>(),
        any::<u8>(),
        prop::collection::vec(any::<u8>(), 1..=64),
    )
}

proptest! {
    #[test]
    fn test_byte_and_frame_feeding_agree(data in rawx_session_strategy()) {
        let mut by_byte = UbxDecoder::new();
        let byte_events: Vec<_> = data
            .iter()
            .map(|b| by_byte.feed(*b))
            .filter(|res| res != &Ok(DecodeEvent::NoMessage))
            .collect();

        let mut by_frame = UbxDecoder::new();
        let frame_events = read_all(&mut by_frame, &data);

        prop_assert_eq!(byte_events, frame_events);
        prop_assert_eq!(by_byte.observations(), by_frame.observations());
        prop_assert_eq!(by_byte.time(), by_frame.time());
    }

    #[test]
    fn test_single_bit_flip_is_rejected(
        (class, msg_id, payload) in payload_strategy(),
        pos in any::<prop::sample::Index>(),
        bit in 0..8u8,
    ) {
        let mut frame = encode_frame(class, msg_id, &payload);
        let offset = 6 + pos.index(payload.len());
        frame[offset] ^= 1 << bit;

        let mut parser = Parser::new();
        let results = push_all(&mut parser, &frame);
        prop_assert_eq!(results.len(), 1);
        prop_assert!(
            matches!(results[0], Err(DecodeError::InvalidChecksum { .. })),
            "expected InvalidChecksum, got {:?}",
            results[0]
        );
    }

    #[test]
    fn test_resync_after_arbitrary_prefix(
        prefix in prop::collection::vec(0..0xb5u8, 0..512),
        (class, msg_id, payload) in payload_strategy(),
    ) {
        let frame = encode_frame(class, msg_id, &payload);
        let mut data = prefix;
        data.extend_from_slice(&frame);

        let mut parser = Parser::new();
        prop_assert_eq!(push_all(&mut parser, &data), vec![Ok(frame.clone())]);

        let mut reader = data.as_slice();
        let read = parser.read_frame(&mut reader).map(|f| f.map(|f| f.as_bytes().to_vec()));
        prop_assert_eq!(read, Ok(Some(frame)));
    }
}

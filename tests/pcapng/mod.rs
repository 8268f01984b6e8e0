use std::time::Duration;

use pcapng_payload::pcapng::PcapNgDecoder;
use pcapng_payload::{DecoderConfig, Endianness, FormatError, PayloadDecoderFactory, PayloadLine, PcapError};

use crate::fixtures::{udp_frame, Capture, ETHERNET, LINUX_SLL, UDP_PAYLOAD_OFFSET};

const SHB_LEN: u64 = 28;
const IDB_LEN: u64 = 20;
const EPB_DATA_OFFSET: u64 = 28;

fn decode_chunked(data: &[u8], size: usize) -> Vec<PayloadLine> {
    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    let mut lines = Vec::new();
    let mut position = 0;

    for chunk in data.chunks(size) {
        lines.extend(decoder.decode(chunk, position).unwrap());
        position += chunk.len() as u64;
    }
    lines.extend(decoder.flush().unwrap());

    lines
}

fn decode_all(data: &[u8]) -> Vec<PayloadLine> {
    decode_chunked(data, data.len().max(1))
}

fn sample_capture(endianness: Endianness) -> Vec<u8> {
    let mut capture = Capture::new(endianness);
    capture
        .section(endianness)
        .interface(ETHERNET, 0xFFFF, None)
        .packet(0, 1_000_000, &udp_frame(b"first payload"))
        .block(2, &[0xAB; 21])
        .packet(0, 2_500_000, &udp_frame(b"second"))
        .packet(0, 3_000_001, &udp_frame(&[0x5A; 301]));
    capture.into_bytes()
}

#[test]
fn single_packet() {
    let mut capture = Capture::new(Endianness::Little);
    capture.section(Endianness::Little).interface(ETHERNET, 0xFFFF, None).packet(0, 1_600_000_000_000_001, &udp_frame(b"hello"));

    let lines = decode_all(&capture.into_bytes());
    assert_eq!(
        lines,
        vec![PayloadLine {
            timestamp: Duration::new(1_600_000_000, 1_000),
            position: SHB_LEN + IDB_LEN + EPB_DATA_OFFSET + UDP_PAYLOAD_OFFSET,
            data: b"hello".to_vec(),
        }]
    );
}

#[test]
fn timestamp_resolution() {
    let mut capture = Capture::new(Endianness::Little);
    capture
        .section(Endianness::Little)
        .interface(ETHERNET, 0xFFFF, Some(9))
        .interface(ETHERNET, 0xFFFF, Some(0x8A))
        .packet(0, 1_600_000_000_123_456_789, &udp_frame(b"nano"))
        .packet(1, 5 * 1024 + 512, &udp_frame(b"binary"));

    let lines = decode_all(&capture.into_bytes());
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].timestamp, Duration::new(1_600_000_000, 123_456_789));
    assert_eq!(lines[1].timestamp, Duration::from_millis(5500));
}

#[test]
fn big_endian_matches_little_endian() {
    let little = decode_all(&sample_capture(Endianness::Little));
    let big = decode_all(&sample_capture(Endianness::Big));

    assert_eq!(little.len(), 3);
    assert_eq!(little, big);
}

#[test]
fn chunking_is_transparent() {
    for endianness in [Endianness::Little, Endianness::Big] {
        let data = sample_capture(endianness);
        let expected = decode_all(&data);
        assert_eq!(expected.len(), 3);

        for size in [1, 2, 3, 5, 8, 13, 21, 50, 100] {
            assert_eq!(decode_chunked(&data, size), expected, "chunks of {size}B");
        }
    }
}

#[test]
fn oversized_blocks_are_skipped() {
    for block_type in [6, 50] {
        let mut capture = Capture::new(Endianness::Little);
        capture
            .section(Endianness::Little)
            .interface(ETHERNET, 0xFFFF, None)
            .packet(0, 1, &udp_frame(b"before"))
            .block(block_type, &vec![0; 70_000 - 12])
            .packet(0, 2, &udp_frame(b"after"));
        let data = capture.into_bytes();

        for size in [data.len(), 4096, 1000, 7] {
            let lines = decode_chunked(&data, size);
            let payloads: Vec<_> = lines.iter().map(|line| line.data.as_slice()).collect();
            assert_eq!(payloads, vec![&b"before"[..], &b"after"[..]], "block type {block_type}, chunks of {size}B");
        }
    }
}

#[test]
fn buffer_capacity_is_configurable() {
    let data = sample_capture(Endianness::Little);

    let config = DecoderConfig::default().with_buffer_capacity(128);
    let mut decoder = PcapNgDecoder::with_config(PayloadDecoderFactory, config);
    let lines = decoder.decode(&data, 0).unwrap();

    // The 301 bytes payload doesn't fit anymore
    assert_eq!(lines.len(), 2);
    assert!(decoder.flush().unwrap().is_empty());
}

#[test]
fn corrupted_trailer() {
    let mut capture = Capture::new(Endianness::Little);
    capture.section(Endianness::Little).interface(ETHERNET, 0xFFFF, None).packet(0, 1, &udp_frame(b"ok"));
    let position = capture.len() as u64;
    capture.block_with_trailer(6, &[0; 20], 0xEEFFEEFF).packet(0, 2, &udp_frame(b"lost"));
    let data = capture.into_bytes();

    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    let lines = decoder.decode(&data, 0).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].data, b"ok");
    assert!(decoder.is_corrupted());

    for _ in 0..2 {
        match decoder.decode(&data, 0) {
            Err(PcapError::CorruptFormat { position: pos, reason }) => {
                assert_eq!(pos, position);
                assert_eq!(reason, FormatError::LengthMismatch(32, 0xEEFFEEFF));
            },
            other => panic!("Expected a corruption, got {other:?}"),
        }
        assert!(matches!(decoder.flush(), Err(PcapError::CorruptFormat { .. })));
    }
}

#[test]
fn corruption_spread_over_chunks() {
    let mut capture = Capture::new(Endianness::Big);
    capture.section(Endianness::Big).interface(ETHERNET, 0xFFFF, None).packet(0, 1, &udp_frame(b"ok"));
    capture.block_with_trailer(2, &[0; 20], 0xEEFFEEFF);
    let data = capture.into_bytes();

    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    let mut lines = Vec::new();
    let mut error = None;
    for (i, chunk) in data.chunks(5).enumerate() {
        match decoder.decode(chunk, (i * 5) as u64) {
            Ok(chunk_lines) => lines.extend(chunk_lines),
            Err(err) => {
                error = Some(err);
                break;
            },
        }
    }

    assert_eq!(lines.len(), 1);
    // The last chunk detects the corruption, nothing follows it
    assert!(error.is_none());
    assert!(decoder.flush().unwrap_err().format_error().is_some());
}

#[test]
fn missing_section_header() {
    let mut capture = Capture::new(Endianness::Little);
    capture.interface(ETHERNET, 0xFFFF, None);

    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    assert!(decoder.decode(&capture.into_bytes(), 0).unwrap().is_empty());

    let err = decoder.flush().unwrap_err();
    assert_eq!(err.format_error(), Some(&FormatError::MissingSectionHeader(0x01000000)));
}

#[test]
fn invalid_section_header() {
    let mut capture = Capture::new(Endianness::Little);
    capture.section_with_version(Endianness::Little, 2, 0).interface(ETHERNET, 0xFFFF, None);
    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    decoder.decode(&capture.into_bytes(), 0).unwrap();
    assert_eq!(decoder.flush().unwrap_err().format_error(), Some(&FormatError::UnsupportedVersion(2, 0)));

    let mut data = sample_capture(Endianness::Little);
    data[8..12].copy_from_slice(&[0x4D, 0x3C, 0x2B, 0x1B]);
    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    decoder.decode(&data, 0).unwrap();
    assert!(matches!(
        decoder.flush(),
        Err(PcapError::CorruptFormat { position: 0, reason: FormatError::InvalidByteOrderMagic(_) })
    ));
}

#[test]
fn zero_length_block() {
    let mut data = sample_capture(Endianness::Little);
    data.extend_from_slice(&[0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let end = data.len() as u64 - 12;

    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    assert_eq!(decoder.decode(&data, 0).unwrap().len(), 3);
    match decoder.flush() {
        Err(PcapError::CorruptFormat { position, reason: FormatError::ZeroLength }) => assert_eq!(position, end),
        other => panic!("Expected a corruption, got {other:?}"),
    }
}

#[test]
fn unusable_interfaces_keep_their_id() {
    let mut capture = Capture::new(Endianness::Little);
    capture
        .section(Endianness::Little)
        .interface(ETHERNET, 0, None)
        .interface(2, 0xFFFF, None)
        .interface(LINUX_SLL, 0xFFFF, None)
        .packet(0, 1, &udp_frame(b"zero snaplen"))
        .packet(1, 2, &udp_frame(b"bad link type"));

    let mut sll_frame = vec![0x00, 0x00, 0x00, 0x01, 0x00, 0x06, 0x10, 0xDF, 0x23, 0x41, 0xE4, 0xC2, 0x00, 0x00];
    sll_frame.extend_from_slice(&udp_frame(b"sll")[12..]);
    capture.packet(2, 3, &sll_frame);

    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    let lines = decoder.decode(&capture.into_bytes(), 0).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].data, b"sll");
    assert!(!decoder.is_corrupted());

    let interfaces: Vec<_> = decoder.reader().interfaces().map(|interface| interface.is_some()).collect();
    assert_eq!(interfaces, vec![false, false, true]);
}

#[test]
fn dropped_packets() {
    let mut capture = Capture::new(Endianness::Little);
    capture
        .section(Endianness::Little)
        .interface(ETHERNET, 64, None)
        .packet(1, 1, &udp_frame(b"unknown interface"))
        .packet(0, 2, &udp_frame(&[0; 40]))
        .packet(0, 3, &udp_frame(b"fits"));

    let lines = decode_all(&capture.into_bytes());
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].data, b"fits");
}

#[test]
fn sections_reset_interfaces() {
    let mut capture = Capture::new(Endianness::Little);
    capture
        .section(Endianness::Little)
        .interface(ETHERNET, 0xFFFF, None)
        .packet(0, 1, &udp_frame(b"little"))
        .section(Endianness::Big)
        .packet(0, 2, &udp_frame(b"no interface yet"))
        .interface(ETHERNET, 0xFFFF, Some(3))
        .packet(0, 2_500, &udp_frame(b"big"));

    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    let lines = decoder.decode(&capture.into_bytes(), 0).unwrap();
    let payloads: Vec<_> = lines.iter().map(|line| line.data.as_slice()).collect();
    assert_eq!(payloads, vec![&b"little"[..], &b"big"[..]]);
    assert_eq!(lines[1].timestamp, Duration::from_millis(2500));

    assert!(!decoder.reader().section().unwrap().is_little_endian());
    assert_eq!(decoder.reader().interfaces().count(), 1);
}

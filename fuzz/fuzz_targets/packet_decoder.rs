#![no_main]
use std::rc::Rc;
use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use pcapng_payload::net::PacketDecoder;
use pcapng_payload::{DecoderConfig, LinkType, PayloadDecoderFactory};

fuzz_target!(|data: &[u8]| {
    let mut decoder = PacketDecoder::new(LinkType::Ethernet, Rc::new(PayloadDecoderFactory), DecoderConfig::default());
    for (i, frame) in data.split(|&b| b == 0xFF).enumerate() {
        let _ = decoder.decode_packet(frame, Duration::from_millis(i as u64), 0);
    }
});

#![no_main]
use libfuzzer_sys::fuzz_target;
use pcapng_payload::pcapng::PcapNgDecoder;
use pcapng_payload::PayloadDecoderFactory;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // The first byte selects the chunk size
    let size = data[0] as usize + 1;
    let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
    let mut position = 1;
    for chunk in data[1..].chunks(size) {
        if decoder.decode(chunk, position).is_err() {
            return;
        }
        position += chunk.len() as u64;
    }
    let _ = decoder.flush();
});

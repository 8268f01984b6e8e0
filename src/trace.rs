//! Contract of the application decoder fed with the extracted payloads.
//!
//! Each UDP flow gets its own [`TraceDecoder`], created by a
//! [`TraceDecoderFactory`] the first time the flow is seen. The decoder is
//! dropped together with the interface it belongs to.

use std::time::Duration;

/// Decoder of the ordered byte stream of one UDP flow.
pub trait TraceDecoder {
    /// Item produced by the decoder.
    type Line;

    /// Decodes the next payload of the flow.
    ///
    /// `position` is the offset of the first byte of `payload` in the capture stream.
    fn decode(&mut self, payload: &[u8], position: u64) -> Vec<Self::Line>;

    /// Returns the lines still buffered by the decoder.
    fn flush(&mut self) -> Vec<Self::Line>;

    /// Capture timestamp of the packet currently decoded.
    fn packet_timestamp(&self) -> Duration;

    /// Sets the capture timestamp of the next payload, relative to the Unix epoch.
    fn set_packet_timestamp(&mut self, timestamp: Duration);
}

/// Creates one [`TraceDecoder`] per flow.
pub trait TraceDecoderFactory {
    /// Decoder created by the factory.
    type Decoder: TraceDecoder;

    /// Creates a new decoder.
    fn create(&self) -> Self::Decoder;
}

/// Line type produced by the decoders of a factory.
pub type LineOf<F> = <<F as TraceDecoderFactory>::Decoder as TraceDecoder>::Line;


/* ----- PayloadDecoder ----- */

/// A UDP payload as extracted from the capture.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PayloadLine {
    /// Capture timestamp of the packet, relative to the Unix epoch
    pub timestamp: Duration,
    /// Position of the first byte of the payload in the capture stream
    pub position: u64,
    /// The payload
    pub data: Vec<u8>,
}

/// [`TraceDecoder`] returning every payload untouched, one line per datagram.
#[derive(Clone, Debug, Default)]
pub struct PayloadDecoder {
    timestamp: Duration,
}

impl TraceDecoder for PayloadDecoder {
    type Line = PayloadLine;

    fn decode(&mut self, payload: &[u8], position: u64) -> Vec<PayloadLine> {
        vec![PayloadLine { timestamp: self.timestamp, position, data: payload.to_vec() }]
    }

    fn flush(&mut self) -> Vec<PayloadLine> {
        Vec::new()
    }

    fn packet_timestamp(&self) -> Duration {
        self.timestamp
    }

    fn set_packet_timestamp(&mut self, timestamp: Duration) {
        self.timestamp = timestamp;
    }
}

/// Factory of [`PayloadDecoder`].
#[derive(Copy, Clone, Debug, Default)]
pub struct PayloadDecoderFactory;

impl TraceDecoderFactory for PayloadDecoderFactory {
    type Decoder = PayloadDecoder;

    fn create(&self) -> PayloadDecoder {
        PayloadDecoder::default()
    }
}

//! Tunables of the decoder.

use std::time::Duration;

/// Default capacity of the block assembly buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 65536;

/// Default UDP destination port of the application payload (DLT).
pub const DEFAULT_UDP_PORT: u16 = 3490;

/// Default maximum gap between two fragments of the same datagram.
pub const DEFAULT_FRAGMENT_TIMEOUT: Duration = Duration::from_millis(15000);

/// Configuration of a [`PcapNgDecoder`](crate::pcapng::PcapNgDecoder).
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use pcapng_payload::DecoderConfig;
///
/// let config = DecoderConfig::default()
///     .with_udp_port(3491)
///     .with_fragment_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.buffer_capacity, 65536);
/// assert_eq!(config.udp_port, 3491);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DecoderConfig {
    /// Largest block that is assembled, bigger blocks are skipped.
    pub buffer_capacity: usize,
    /// Only UDP datagrams to this destination port carry payload.
    pub udp_port: u16,
    /// Fragments further apart than this are not reassembled together.
    pub fragment_timeout: Duration,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            udp_port: DEFAULT_UDP_PORT,
            fragment_timeout: DEFAULT_FRAGMENT_TIMEOUT,
        }
    }
}

impl DecoderConfig {
    /// Sets the capacity of the block assembly buffer.
    ///
    /// Values below 12 bytes are raised to 12, a block header must always fit.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(12);
        self
    }

    /// Sets the application UDP destination port.
    pub fn with_udp_port(mut self, port: u16) -> Self {
        self.udp_port = port;
        self
    }

    /// Sets the fragment reassembly timeout.
    pub fn with_fragment_timeout(mut self, timeout: Duration) -> Self {
        self.fragment_timeout = timeout;
        self
    }
}

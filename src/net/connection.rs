//! Flow multiplexing: one application decoder per UDP flow, one reassembler per datagram.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use log::{debug, trace, warn};

use super::fragments::{FragmentResult, IpFragments};
use crate::common::be_u16;
use crate::config::DecoderConfig;
use crate::trace::{LineOf, TraceDecoder, TraceDecoderFactory};

/// Length of the UDP header.
pub const UDP_HEADER_LEN: usize = 8;

/// Source and destination addresses of an IPv4 packet.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ConnectionKey {
    /// Source address
    pub src: Ipv4Addr,
    /// Destination address
    pub dst: Ipv4Addr,
}

/// Source and destination ports of a UDP datagram.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EndPointKey {
    /// Source port
    pub src_port: u16,
    /// Destination port
    pub dst_port: u16,
}

/// A fragment of an IPv4 datagram, as read from its packet.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Fragment<'a> {
    pub id: u16,
    pub offset: usize,
    pub more_fragments: bool,
    pub checksum: u16,
    pub payload: &'a [u8],
    pub timestamp: Duration,
    pub position: u64,
}

/// Traffic between two addresses.
///
/// Decoders and reassemblers are created on first use and dropped with the connection.
pub struct Connection<F: TraceDecoderFactory> {
    decoders: HashMap<EndPointKey, F::Decoder>,
    fragments: HashMap<u16, IpFragments>,
}

impl<F: TraceDecoderFactory> Default for Connection<F> {
    fn default() -> Self {
        Connection { decoders: HashMap::new(), fragments: HashMap::new() }
    }
}

impl<F: TraceDecoderFactory> Connection<F> {
    /// Number of UDP flows seen on this connection.
    pub fn flows(&self) -> usize {
        self.decoders.len()
    }

    /// Number of datagrams being reassembled.
    pub fn pending_datagrams(&self) -> usize {
        self.fragments.len()
    }

    /// Decodes a UDP datagram, `datagram` starting at the UDP header.
    pub(crate) fn decode_datagram(
        &mut self,
        datagram: &[u8],
        timestamp: Duration,
        position: u64,
        factory: &F,
        config: &DecoderConfig,
    ) -> Vec<LineOf<F>> {
        let (Some(src_port), Some(dst_port), Some(udp_len)) = (be_u16(datagram, 0), be_u16(datagram, 2), be_u16(datagram, 4))
        else {
            return Vec::new();
        };

        if dst_port != config.udp_port {
            trace!("Discarded UDP packet to port {dst_port}, position {position:#x}");
            return Vec::new();
        }

        let udp_len = udp_len as usize;
        if udp_len < UDP_HEADER_LEN || udp_len > datagram.len() {
            warn!(
                "Discarded invalid UDP packet, position {position:#x}, length {udp_len}, actual size {}",
                datagram.len()
            );
            return Vec::new();
        }

        let decoder = self.decoders.entry(EndPointKey { src_port, dst_port }).or_insert_with(|| factory.create());
        decoder.set_packet_timestamp(timestamp);
        decoder.decode(&datagram[UDP_HEADER_LEN..udp_len], position + UDP_HEADER_LEN as u64)
    }

    /// Adds a fragment, decoding the datagram once reassembled.
    ///
    /// A fragment violating the reassembly rules discards the fragments of its datagram and
    /// starts a new reassembly.
    pub(crate) fn add_fragment(&mut self, fragment: Fragment, factory: &F, config: &DecoderConfig) -> Vec<LineOf<F>> {
        let Fragment { id, offset, more_fragments, checksum, payload, timestamp, position } = fragment;

        let fragments = self.fragments.entry(id).or_insert_with(|| IpFragments::with_timeout(id, config.fragment_timeout));
        let mut result = fragments.add_fragment(offset, more_fragments, checksum, payload, timestamp, position);

        if result.is_invalid() {
            warn!(
                "Discarded {} fragments of datagram {id:#06x}: {result:?}, position {position:#x}",
                fragments.len()
            );
            *fragments = IpFragments::with_timeout(id, config.fragment_timeout);
            result = fragments.add_fragment(offset, more_fragments, checksum, payload, timestamp, position);
        }

        if result != FragmentResult::Reassembled {
            return Vec::new();
        }

        let Some(fragments) = self.fragments.remove(&id) else {
            return Vec::new();
        };
        let datagram = fragments.reassemble();
        let first = &fragments.fragments()[0];
        debug!("Reassembled datagram {id:#06x} from {} fragments, {}B", fragments.len(), datagram.len());

        self.decode_datagram(&datagram, fragments.timestamp().unwrap_or(timestamp), first.position(), factory, config)
    }
}

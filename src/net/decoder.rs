use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, trace, warn};

use super::connection::{Connection, ConnectionKey, Fragment};
use super::tecmp::{TecmpError, TecmpFrame, ETHERTYPE_TECMP, ETHERTYPE_TECMP_LEGACY};
use crate::common::be_u16;
use crate::config::DecoderConfig;
use crate::trace::{LineOf, TraceDecoderFactory};
use crate::LinkType;

/// IPv4 ethertype
pub const ETHERTYPE_IPV4: u16 = 0x0800;
/// IEEE 802.1Q VLAN tag
pub const ETHERTYPE_VLAN: u16 = 0x8100;
/// IEEE 802.1ad service VLAN tag
pub const ETHERTYPE_QINQ: u16 = 0x88A8;
/// Pre-standard QinQ tag
pub const ETHERTYPE_QINQ_LEGACY: u16 = 0x9100;

/// UDP protocol number
pub const IP_PROTOCOL_UDP: u8 = 17;

/// IPv4, UDP and the smallest application header.
const MIN_IPV4_LEN: usize = 36;
const VLAN_TAG_LEN: usize = 4;
const MAX_TECMP_VERSION_WARNINGS: u32 = 10;

/// Decodes the captured frames of one interface into application lines.
///
/// The frames are demultiplexed down to UDP, IPv4 fragments are reassembled, and every UDP
/// flow is fed to its own decoder created from the factory.
pub struct PacketDecoder<F: TraceDecoderFactory> {
    link_type: LinkType,
    factory: Rc<F>,
    config: DecoderConfig,
    connections: HashMap<ConnectionKey, Connection<F>>,
    tecmp_version_warnings: u32,
}

impl<F: TraceDecoderFactory> PacketDecoder<F> {
    /// Creates a decoder for frames of the given link type.
    pub fn new(link_type: LinkType, factory: Rc<F>, config: DecoderConfig) -> Self {
        PacketDecoder { link_type, factory, config, connections: HashMap::new(), tecmp_version_warnings: 0 }
    }

    /// Link type of the decoded frames.
    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Connection between two addresses, if traffic was seen.
    pub fn connection(&self, src: Ipv4Addr, dst: Ipv4Addr) -> Option<&Connection<F>> {
        self.connections.get(&ConnectionKey { src, dst })
    }

    /// Decodes one captured frame.
    ///
    /// `position` is the offset of the frame in the capture stream. Frames that don't carry
    /// application traffic return no line.
    pub fn decode_packet(&mut self, frame: &[u8], timestamp: Duration, position: u64) -> Vec<LineOf<F>> {
        self.decode_frame(frame, self.link_type, timestamp, position, true)
    }

    fn decode_frame(&mut self, frame: &[u8], link_type: LinkType, timestamp: Duration, position: u64, tunnel: bool) -> Vec<LineOf<F>> {
        let Some((offset, ethertype)) = ethertype_offset(frame, link_type.header_len()) else {
            trace!("Discarded short frame, position {position:#x}");
            return Vec::new();
        };

        let payload = &frame[offset..];
        let position = position + offset as u64;
        match ethertype {
            ETHERTYPE_IPV4 => self.decode_ipv4(payload, timestamp, position),
            ETHERTYPE_TECMP | ETHERTYPE_TECMP_LEGACY if tunnel => self.decode_tecmp(payload, timestamp, position),
            _ => {
                trace!("Discarded frame with ethertype {ethertype:#06x}, position {position:#x}");
                Vec::new()
            },
        }
    }

    fn decode_tecmp(&mut self, payload: &[u8], timestamp: Duration, position: u64) -> Vec<LineOf<F>> {
        let tecmp = match TecmpFrame::from_slice(payload) {
            Ok(tecmp) => tecmp,
            Err(TecmpError::UnsupportedVersion(version)) => {
                self.tecmp_version_warnings = self.tecmp_version_warnings.saturating_add(1);
                if self.tecmp_version_warnings <= MAX_TECMP_VERSION_WARNINGS {
                    warn!("Discarded TECMP frame with unsupported version {version}, position {position:#x}");
                }
                if self.tecmp_version_warnings == MAX_TECMP_VERSION_WARNINGS {
                    warn!("Further TECMP version warnings suppressed");
                }
                return Vec::new();
            },
            Err(err) => {
                debug!("Discarded TECMP frame, position {position:#x}: {err}");
                return Vec::new();
            },
        };

        let mut lines = Vec::new();
        for record in tecmp.records() {
            lines.extend(self.decode_frame(record.frame, LinkType::Ethernet, timestamp, position + record.offset as u64, false));
        }
        lines
    }

    fn decode_ipv4(&mut self, packet: &[u8], timestamp: Duration, position: u64) -> Vec<LineOf<F>> {
        if packet.len() < MIN_IPV4_LEN || packet[0] >> 4 != 4 || packet[9] != IP_PROTOCOL_UDP {
            return Vec::new();
        }

        let ihl = ((packet[0] & 0x0F) as usize) << 2;
        let total_len = be_u16(packet, 2).unwrap_or_default() as usize;
        if ihl < 20 || total_len < ihl || total_len > packet.len() {
            debug!("Discarded invalid IPv4 packet, position {position:#x}, length {total_len}, actual size {}", packet.len());
            return Vec::new();
        }

        let packet = &packet[..total_len];
        let more_fragments = packet[6] & 0x20 != 0;
        let fragment_offset = ((((packet[6] & 0x1F) as usize) << 8) + packet[7] as usize) * 8;

        let key = ConnectionKey {
            src: Ipv4Addr::new(packet[12], packet[13], packet[14], packet[15]),
            dst: Ipv4Addr::new(packet[16], packet[17], packet[18], packet[19]),
        };
        let connection = self.connections.entry(key).or_default();
        let position = position + ihl as u64;

        if more_fragments || fragment_offset != 0 {
            let fragment = Fragment {
                id: be_u16(packet, 4).unwrap_or_default(),
                offset: fragment_offset,
                more_fragments,
                checksum: be_u16(packet, 10).unwrap_or_default(),
                payload: &packet[ihl..],
                timestamp,
                position,
            };
            connection.add_fragment(fragment, &self.factory, &self.config)
        }
        else {
            connection.decode_datagram(&packet[ihl..], timestamp, position, &self.factory, &self.config)
        }
    }
}

/// Skips the link header and up to two VLAN tags.
///
/// Returns the offset of the network layer and its ethertype.
fn ethertype_offset(frame: &[u8], header_len: usize) -> Option<(usize, u16)> {
    let mut offset = header_len;
    let mut ethertype = be_u16(frame, offset)?;

    if matches!(ethertype, ETHERTYPE_VLAN | ETHERTYPE_QINQ | ETHERTYPE_QINQ_LEGACY) {
        offset += VLAN_TAG_LEN;
        ethertype = be_u16(frame, offset)?;

        if ethertype == ETHERTYPE_VLAN {
            offset += VLAN_TAG_LEN;
            ethertype = be_u16(frame, offset)?;
        }
    }

    Some((offset + 2, ethertype))
}

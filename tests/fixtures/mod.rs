//! Builders of PcapNg captures and captured frames.

#![allow(dead_code)]

use pcapng_payload::Endianness;

pub const ETHERNET: u16 = 1;
pub const LINUX_SLL: u16 = 113;

pub const MACS: [u8; 12] = [0x10, 0xDF, 0x23, 0x41, 0xE4, 0xC2, 0x74, 0xE7, 0xB1, 0x14, 0x44, 0x5E];
pub const SRC_ADDR: [u8; 4] = [0xC0, 0xA8, 0x01, 0x01];
pub const DST_ADDR: [u8; 4] = [0xEF, 0xFF, 0x2A, 0x63];

/// Offset of the UDP payload in a frame built by [`udp_frame`].
pub const UDP_PAYLOAD_OFFSET: u64 = 14 + 20 + 8;

/// A PcapNg capture under construction.
pub struct Capture {
    endianness: Endianness,
    data: Vec<u8>,
}

impl Capture {
    pub fn new(endianness: Endianness) -> Self {
        Capture { endianness, data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn u16(&self, value: u16) -> [u8; 2] {
        match self.endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        }
    }

    fn u32(&self, value: u32) -> [u8; 4] {
        match self.endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        }
    }

    /// Appends a block, padding the body to 32 bits.
    pub fn block(&mut self, block_type: u32, body: &[u8]) -> &mut Self {
        let padded = (body.len() + 3) & !3;
        let length = (12 + padded) as u32;
        self.block_with_trailer(block_type, body, length)
    }

    /// Appends a block with an arbitrary trailing length.
    pub fn block_with_trailer(&mut self, block_type: u32, body: &[u8], trailer: u32) -> &mut Self {
        let padded = (body.len() + 3) & !3;
        let length = (12 + padded) as u32;

        let block_type = self.u32(block_type);
        let length = self.u32(length);
        let trailer = self.u32(trailer);
        self.data.extend_from_slice(&block_type);
        self.data.extend_from_slice(&length);
        self.data.extend_from_slice(body);
        self.data.resize(self.data.len() + padded - body.len(), 0);
        self.data.extend_from_slice(&trailer);
        self
    }

    /// Switches the endianness and appends a Section Header Block.
    pub fn section(&mut self, endianness: Endianness) -> &mut Self {
        self.section_with_version(endianness, 1, 0)
    }

    pub fn section_with_version(&mut self, endianness: Endianness, major: u16, minor: u16) -> &mut Self {
        self.endianness = endianness;

        let mut body = Vec::new();
        body.extend_from_slice(&self.u32(0x1A2B3C4D));
        body.extend_from_slice(&self.u16(major));
        body.extend_from_slice(&self.u16(minor));
        body.extend_from_slice(&[0xFF; 8]);
        self.block(0x0A0D0D0A, &body)
    }

    /// Appends an Interface Description Block, with an optional `if_tsresol` option.
    pub fn interface(&mut self, link_type: u16, snap_len: u32, ts_resol: Option<u8>) -> &mut Self {
        let mut body = Vec::new();
        body.extend_from_slice(&self.u16(link_type));
        body.extend_from_slice(&[0, 0]);
        body.extend_from_slice(&self.u32(snap_len));

        if let Some(ts_resol) = ts_resol {
            body.extend_from_slice(&self.u16(9));
            body.extend_from_slice(&self.u16(1));
            body.extend_from_slice(&[ts_resol, 0, 0, 0]);
            body.extend_from_slice(&[0, 0, 0, 0]);
        }
        self.block(1, &body)
    }

    /// Appends an Enhanced Packet Block.
    pub fn packet(&mut self, interface_id: u32, timestamp: u64, data: &[u8]) -> &mut Self {
        let mut body = Vec::new();
        body.extend_from_slice(&self.u32(interface_id));
        body.extend_from_slice(&self.u32((timestamp >> 32) as u32));
        body.extend_from_slice(&self.u32(timestamp as u32));
        body.extend_from_slice(&self.u32(data.len() as u32));
        body.extend_from_slice(&self.u32(data.len() as u32));
        body.extend_from_slice(data);
        self.block(6, &body)
    }
}

/// IPv4 and UDP headers to port 3490 followed by `payload`, starting at the ethertype.
pub fn ipv4_udp(src_port: u16, payload: &[u8]) -> Vec<u8> {
    let ip_len = (28 + payload.len() as u16).to_be_bytes();
    let udp_len = (8 + payload.len() as u16).to_be_bytes();
    let src_port = src_port.to_be_bytes();

    let mut packet = vec![0x08, 0x00, 0x45, 0x00, ip_len[0], ip_len[1], 0x3A, 0x25, 0x00, 0x00, 0x01, 0x11, 0xA3, 0x65];
    packet.extend_from_slice(&SRC_ADDR);
    packet.extend_from_slice(&DST_ADDR);
    packet.extend_from_slice(&[src_port[0], src_port[1], 0x0D, 0xA2, udp_len[0], udp_len[1], 0xB5, 0xCF]);
    packet.extend_from_slice(payload);
    packet
}

/// Ethernet frame carrying a UDP datagram to port 3490, padded to 60 bytes.
pub fn udp_frame(payload: &[u8]) -> Vec<u8> {
    udp_frame_from(3490, payload)
}

/// Ethernet frame carrying a UDP datagram from `src_port` to port 3490, padded to 60 bytes.
pub fn udp_frame_from(src_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = MACS.to_vec();
    frame.extend_from_slice(&ipv4_udp(src_port, payload));
    frame.resize(frame.len().max(60), 0);
    frame
}

/// Ethernet frames carrying the IPv4 fragments of one UDP datagram, each fragment holding
/// at most `size` bytes, `size` being a multiple of 8.
pub fn fragmented_frames(id: u16, payload: &[u8], size: usize) -> Vec<Vec<u8>> {
    let datagram = ipv4_udp(3490, payload)[22..].to_vec();
    let chunks: Vec<&[u8]> = datagram.chunks(size).collect();
    let id = id.to_be_bytes();

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let flags = if i + 1 < chunks.len() { 0x2000 } else { 0 };
            let fragment = (flags | (i * size / 8) as u16).to_be_bytes();
            let ip_len = (20 + chunk.len() as u16).to_be_bytes();

            let mut frame = MACS.to_vec();
            frame.extend_from_slice(&[0x08, 0x00, 0x45, 0x00, ip_len[0], ip_len[1], id[0], id[1], fragment[0], fragment[1]]);
            frame.extend_from_slice(&[0x01, 0x11, 0xA3, i as u8]);
            frame.extend_from_slice(&SRC_ADDR);
            frame.extend_from_slice(&DST_ADDR);
            frame.extend_from_slice(chunk);
            frame.resize(frame.len().max(60), 0);
            frame
        })
        .collect()
}

/// Ethernet frame carrying a TECMP log stream of captured Ethernet frames.
pub fn tecmp_frame(version: u8, records: &[Vec<u8>]) -> Vec<u8> {
    let mut frame = MACS.to_vec();
    frame.extend_from_slice(&[0x99, 0xFE, 0x00, 0x80, 0x72, 0x14, version, 0x03, 0x00, 0x80, 0x00, 0x00, 0x00, 0x0F]);
    for record in records {
        let len = (record.len() as u16).to_be_bytes();
        frame.extend_from_slice(&[0x00, 0x00, 0x01, 0x2A, 0x00, 0x00, 0x2E, 0x68, 0xCF, 0xFE, 0x5B, 0x60, len[0], len[1], 0x00, 0x00]);
        frame.extend_from_slice(record);
    }
    frame
}

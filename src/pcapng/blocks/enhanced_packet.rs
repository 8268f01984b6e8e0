//! Enhanced Packet Block (EPB).

use super::ENHANCED_PACKET_BLOCK;
use crate::errors::FormatError;
use crate::Endianness;

/// An Enhanced Packet Block (EPB) is the standard container for storing the packets coming from the network.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnhancedPacketBlock<'a> {
    /// It specifies the interface this packet comes from, by position in the
    /// interfaces of the current section.
    pub interface_id: u32,

    /// Raw timestamp, in units of the interface's time resolution.
    pub timestamp: u64,

    /// Number of octets captured from the packet.
    pub captured_len: u32,

    /// Actual length of the packet when it was transmitted on the network.
    pub original_len: u32,

    /// The data coming from the network, including link-layer headers.
    pub data: &'a [u8],
}

impl<'a> EnhancedPacketBlock<'a> {
    /// Fixed part of the block, including the generic header and trailer.
    pub const MIN_LEN: usize = 32;

    /// Offset of the packet data from the start of the block.
    pub const DATA_OFFSET: usize = 28;

    /// Parses an Enhanced Packet Block.
    ///
    /// `block` holds the whole block, its framing has already been validated.
    pub fn from_slice(block: &'a [u8], endianness: Endianness) -> Result<Self, FormatError> {
        if block.len() < Self::MIN_LEN {
            return Err(FormatError::BodyTooShort {
                block_type: ENHANCED_PACKET_BLOCK,
                length: block.len() as u32,
                minimum: Self::MIN_LEN as u32,
            });
        }

        let interface_id = endianness.read_u32(&block[8..]);
        let ts_high = endianness.read_u32(&block[12..]) as u64;
        let ts_low = endianness.read_u32(&block[16..]) as u64;
        let captured_len = endianness.read_u32(&block[20..]);
        let original_len = endianness.read_u32(&block[24..]);

        let needed = Self::MIN_LEN + captured_len as usize;
        if block.len() < needed {
            return Err(FormatError::BodyTooShort {
                block_type: ENHANCED_PACKET_BLOCK,
                length: block.len() as u32,
                minimum: needed as u32,
            });
        }

        let data = &block[Self::DATA_OFFSET..Self::DATA_OFFSET + captured_len as usize];

        Ok(EnhancedPacketBlock { interface_id, timestamp: (ts_high << 32) | ts_low, captured_len, original_len, data })
    }
}

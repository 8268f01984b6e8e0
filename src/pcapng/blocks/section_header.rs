//! Section Header Block (SHB).

use byteorder_slice::{BigEndian, ByteOrder};
use derive_into_owned::IntoOwned;

use super::opt_common::{OptionScope, PcapOptions};
use super::SECTION_HEADER_BLOCK;
use crate::errors::FormatError;
use crate::Endianness;

/// Byte-order magic as read in big endian from a big endian section.
pub const BYTE_ORDER_MAGIC_BE: u32 = 0x1A2B3C4D;
/// Byte-order magic as read in big endian from a little endian section.
pub const BYTE_ORDER_MAGIC_LE: u32 = 0x4D3C2B1A;

/// Endianness announced by the byte-order magic at offset 8 of a Section Header Block.
pub(crate) fn section_endianness(block: &[u8]) -> Result<Endianness, FormatError> {
    if block.len() < 12 {
        return Err(FormatError::IncompleteBlock(12, block.len()));
    }

    match BigEndian::read_u32(&block[8..]) {
        BYTE_ORDER_MAGIC_BE => Ok(Endianness::Big),
        BYTE_ORDER_MAGIC_LE => Ok(Endianness::Little),
        magic => Err(FormatError::InvalidByteOrderMagic(magic)),
    }
}

/// Section Header Block: it defines the most important characteristics of the capture file.
///
/// Its endianness governs every following block until the next Section Header Block.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct SectionHeaderBlock<'a> {
    /// Endianness of the section.
    pub endianness: Endianness,

    /// Major version of the format.
    /// Current value is 1.
    pub major_version: u16,

    /// Minor version of the format.
    /// Current value is 0.
    pub minor_version: u16,

    /// Length in bytes of the following section excluding this block.
    ///
    /// Length of -1i64 means that the length is unspecified.
    pub section_length: i64,

    /// Options
    pub options: PcapOptions<'a>,
}

impl<'a> SectionHeaderBlock<'a> {
    /// Fixed part of the block, including the generic header and trailer.
    pub const MIN_LEN: usize = 28;

    /// Parses a Section Header Block.
    ///
    /// `block` holds the whole block, its framing has already been validated.
    pub fn from_slice(block: &'a [u8]) -> Result<Self, FormatError> {
        if block.len() < Self::MIN_LEN {
            return Err(FormatError::BodyTooShort {
                block_type: SECTION_HEADER_BLOCK,
                length: block.len() as u32,
                minimum: Self::MIN_LEN as u32,
            });
        }

        let endianness = section_endianness(block)?;

        let major_version = endianness.read_u16(&block[12..]);
        let minor_version = endianness.read_u16(&block[14..]);
        if (major_version, minor_version) != (1, 0) {
            return Err(FormatError::UnsupportedVersion(major_version, minor_version));
        }

        let section_length = endianness.read_u64(&block[16..]) as i64;
        let options = PcapOptions::from_slice(&block[24..block.len() - 4], OptionScope::SectionHeader, endianness)?;

        Ok(SectionHeaderBlock { endianness, major_version, minor_version, section_length, options })
    }

    /// Returns true if the section is little endian.
    pub fn is_little_endian(&self) -> bool {
        self.endianness.is_little()
    }
}

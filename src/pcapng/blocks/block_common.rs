use byteorder_slice::{BigEndian, ByteOrder};

use super::section_header::section_endianness;
use super::{InterfaceDescriptionBlock, SectionHeaderBlock, SECTION_HEADER_BLOCK};
use crate::errors::FormatError;
use crate::Endianness;

/// Size of the generic block header: type and length.
pub const BLOCK_HEADER_LEN: usize = 8;

/// Smallest valid block: header and trailing length.
pub const MIN_BLOCK_LEN: usize = 12;

/// Generic PcapNg block descriptor, as read from the first bytes of a block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BlockHeader {
    /// Type field
    pub block_type: u32,
    /// Block total length
    pub length: u32,
    /// Endianness the block is encoded with
    pub endianness: Endianness,
}

impl BlockHeader {
    /// Reads the header of a block.
    ///
    /// A Section Header Block announces its own endianness. Any other block is read with the
    /// endianness of the current section, there must be one.
    pub fn peek(slice: &[u8], section: Option<Endianness>) -> Result<Self, FormatError> {
        if slice.len() < MIN_BLOCK_LEN {
            return Err(FormatError::IncompleteBlock(MIN_BLOCK_LEN, slice.len()));
        }

        // The Section Header type reads the same in both endiannesses
        let endianness = if BigEndian::read_u32(slice) == SECTION_HEADER_BLOCK {
            section_endianness(slice)?
        }
        else {
            section.ok_or(FormatError::MissingSectionHeader(BigEndian::read_u32(slice)))?
        };

        Ok(BlockHeader { block_type: endianness.read_u32(slice), length: endianness.read_u32(&slice[4..]), endianness })
    }
}

//   0               1               2               3
//   0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                          Block Type                           |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                      Block Total Length                       |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  /                          Block Body                           /
//  /          /* variable length, aligned to 32 bits */            /
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                      Block Total Length                       |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// PcapNg block whose generic framing has been validated.
#[derive(Clone, Debug)]
pub struct RawBlock<'a> {
    /// Header of the block
    pub header: BlockHeader,
    /// The whole block, from the type field to the trailing length
    pub data: &'a [u8],
}

impl<'a> RawBlock<'a> {
    /// Validates the framing of the block starting at `slice`.
    ///
    /// Checks the minimum size, that the whole block is available and that the trailing length
    /// equals the leading one.
    pub fn from_slice(slice: &'a [u8], header: BlockHeader) -> Result<Self, FormatError> {
        let length = header.length as usize;

        if length < MIN_BLOCK_LEN {
            return Err(FormatError::BlockTooShort(header.length));
        }

        if slice.len() < length {
            return Err(FormatError::IncompleteBlock(length, slice.len()));
        }

        let trailer_len = header.endianness.read_u32(&slice[length - 4..]);
        if trailer_len != header.length {
            return Err(FormatError::LengthMismatch(header.length, trailer_len));
        }

        Ok(RawBlock { header, data: &slice[..length] })
    }
}

/// PcapNg block as interpreted by the
/// [`BlockReader`](crate::pcapng::BlockReader).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Block<'a> {
    /// Section Header block
    SectionHeader(SectionHeaderBlock<'a>),
    /// Interface Description block
    InterfaceDescription(InterfaceDescriptionBlock<'a>),
    /// Any other block, including an Interface Description block with unsupported fields
    Generic(BlockHeader),
}

impl<'a> Block<'a> {
    /// Returns the SectionHeader block, if any
    pub fn as_section_header(&self) -> Option<&SectionHeaderBlock<'a>> {
        match self {
            Block::SectionHeader(block) => Some(block),
            _ => None,
        }
    }

    /// Returns the InterfaceDescription block, if any
    pub fn as_interface_description(&self) -> Option<&InterfaceDescriptionBlock<'a>> {
        match self {
            Block::InterfaceDescription(block) => Some(block),
            _ => None,
        }
    }
}

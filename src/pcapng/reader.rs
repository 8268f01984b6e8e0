use std::rc::Rc;

use byteorder_slice::{BigEndian, ByteOrder};
use log::{debug, warn};

use super::blocks::{
    Block, BlockHeader, EnhancedPacketBlock, InterfaceDescriptionBlock, RawBlock, SectionHeaderBlock, ENHANCED_PACKET_BLOCK,
    INTERFACE_DESCRIPTION_BLOCK, SECTION_HEADER_BLOCK,
};
use super::state::{Interface, PcapNgState};
use crate::config::DecoderConfig;
use crate::errors::FormatError;
use crate::net::PacketDecoder;
use crate::trace::{LineOf, TraceDecoderFactory};

/// Interprets complete PcapNg blocks.
///
/// Keeps the endianness of the current section and its interfaces, and routes the
/// Enhanced Packet Blocks to the [`PacketDecoder`] of their interface.
///
/// Errors returned by the reader only describe what is wrong with a block, the caller
/// decides whether the stream can go on.
///
/// # Examples
///
/// ```rust
/// use pcapng_payload::pcapng::BlockReader;
/// use pcapng_payload::PayloadDecoderFactory;
///
/// let shb = [
///     0x0A, 0x0D, 0x0D, 0x0A, 0x1C, 0x00, 0x00, 0x00, 0x4D, 0x3C, 0x2B, 0x1A, 0x01, 0x00, 0x00, 0x00,
///     0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x1C, 0x00, 0x00, 0x00,
/// ];
///
/// let mut reader = BlockReader::new(PayloadDecoderFactory);
/// let block = reader.parse_block(&shb, 0).unwrap();
///
/// assert!(block.as_section_header().unwrap().is_little_endian());
/// ```
pub struct BlockReader<F: TraceDecoderFactory> {
    factory: Rc<F>,
    config: DecoderConfig,
    state: PcapNgState<F>,
}

impl<F: TraceDecoderFactory> BlockReader<F> {
    /// Creates a new reader with the default configuration.
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, DecoderConfig::default())
    }

    /// Creates a new reader.
    pub fn with_config(factory: F, config: DecoderConfig) -> Self {
        BlockReader { factory: Rc::new(factory), config, state: PcapNgState::default() }
    }

    /// Returns the current SectionHeaderBlock, `None` before the first valid one.
    pub fn section(&self) -> Option<&SectionHeaderBlock<'static>> {
        self.state.section.as_ref()
    }

    /// Returns the interfaces of the current section, `None` for the unusable ones.
    pub fn interfaces(&self) -> impl Iterator<Item = Option<&Interface<F>>> {
        self.state.interfaces.iter().map(Option::as_ref)
    }

    /// Returns the interface with the given id.
    pub fn interface(&self, interface_id: u32) -> Option<&Interface<F>> {
        self.state.interfaces.get(interface_id as usize)?.as_ref()
    }

    /// Reads the type and length of the block at the start of `buffer`.
    ///
    /// Needs at least 12 bytes. A Section Header Block gives its own endianness, any other
    /// block needs a valid section.
    pub fn peek_header(&self, buffer: &[u8]) -> Result<BlockHeader, FormatError> {
        BlockHeader::peek(buffer, self.state.endianness())
    }

    /// Parses a complete block, updating the state for Section Header and
    /// Interface Description blocks.
    ///
    /// An Interface Description Block that can't be used is returned as
    /// [`Block::Generic`], its interface id stays reserved.
    pub fn parse_block<'a>(&mut self, buffer: &'a [u8], position: u64) -> Result<Block<'a>, FormatError> {
        if buffer.len() >= 4 && BigEndian::read_u32(buffer) == SECTION_HEADER_BLOCK {
            return match parse_section_header(buffer) {
                Ok(section) => {
                    debug!("Section at {position:#x}, endianness {:?}", section.endianness);
                    self.state.start_section(Some(section.clone().into_owned()));
                    Ok(Block::SectionHeader(section))
                },
                Err(err) => {
                    warn!("Invalid section header at {position:#x}: {err}");
                    self.state.start_section(None);
                    Err(err)
                },
            };
        }

        let header = self.peek_header(buffer)?;
        let raw = RawBlock::from_slice(buffer, header)?;

        if header.block_type != INTERFACE_DESCRIPTION_BLOCK {
            return Ok(Block::Generic(header));
        }

        match InterfaceDescriptionBlock::from_slice(raw.data, header.endianness) {
            Ok(description) => {
                let decoder = PacketDecoder::new(description.link_type, Rc::clone(&self.factory), self.config);
                let interface = Interface { description: description.clone().into_owned(), decoder };
                let id = self.state.push_interface(Some(interface));
                debug!("Interface {id} at {position:#x}: {:?}, snaplen {}", description.link_type, description.snap_len);
                Ok(Block::InterfaceDescription(description))
            },
            Err(err) => {
                let id = self.state.push_interface(None);
                warn!("Ignoring interface {id} at {position:#x}: {err}");
                Ok(Block::Generic(header))
            },
        }
    }

    /// Decodes a complete Enhanced Packet Block.
    ///
    /// Returns an error if the framing of the block is invalid. A packet that can't be
    /// decoded, such as one referencing an unknown interface, is dropped and gives no line.
    pub fn decode_block(&mut self, buffer: &[u8], position: u64) -> Result<Vec<LineOf<F>>, FormatError> {
        let header = self.peek_header(buffer)?;
        let raw = RawBlock::from_slice(buffer, header)?;

        if header.block_type != ENHANCED_PACKET_BLOCK {
            return Ok(Vec::new());
        }

        let packet = match EnhancedPacketBlock::from_slice(raw.data, header.endianness) {
            Ok(packet) => packet,
            Err(err) => {
                warn!("Dropped packet at {position:#x}: {err}");
                return Ok(Vec::new());
            },
        };

        let Some(timestamp) = self.state.decode_timestamp(packet.interface_id, packet.timestamp) else {
            debug!("Dropped packet at {position:#x}: unknown interface {}", packet.interface_id);
            return Ok(Vec::new());
        };

        let Some(interface) = self.state.interface_mut(packet.interface_id) else {
            return Ok(Vec::new());
        };

        if packet.captured_len > interface.description.snap_len {
            warn!(
                "Dropped packet at {position:#x}: captured_len > snap_len: {} > {}",
                packet.captured_len, interface.description.snap_len
            );
            return Ok(Vec::new());
        }

        let data_position = position + EnhancedPacketBlock::DATA_OFFSET as u64;
        Ok(interface.decoder.decode_packet(packet.data, timestamp, data_position))
    }
}

fn parse_section_header(buffer: &[u8]) -> Result<SectionHeaderBlock<'_>, FormatError> {
    let header = BlockHeader::peek(buffer, None)?;
    let raw = RawBlock::from_slice(buffer, header)?;
    SectionHeaderBlock::from_slice(raw.data)
}

use std::time::Duration;

use super::blocks::{InterfaceDescriptionBlock, SectionHeaderBlock};
use crate::net::PacketDecoder;
use crate::trace::TraceDecoderFactory;
use crate::Endianness;

#[cfg(doc)]
use {super::blocks::EnhancedPacketBlock, super::BlockReader};

/// An interface declared in the current section, with the decoder of its packets.
pub struct Interface<F: TraceDecoderFactory> {
    /// The declaration of the interface
    pub(crate) description: InterfaceDescriptionBlock<'static>,
    /// Decoder of the packets captured on the interface
    pub(crate) decoder: PacketDecoder<F>,
}

impl<F: TraceDecoderFactory> Interface<F> {
    /// The Interface Description Block declaring the interface.
    pub fn description(&self) -> &InterfaceDescriptionBlock<'static> {
        &self.description
    }

    /// The decoder of the packets of the interface.
    pub fn decoder(&self) -> &PacketDecoder<F> {
        &self.decoder
    }
}

/// State that must be maintained whilst reading a PcapNg stream.
///
/// This state is necessary because the decoding of blocks depends on
/// information seen earlier in the stream, such as the [`Endianness`] of the
/// [`SectionHeaderBlock`] and the interfaces referenced by each
/// [`EnhancedPacketBlock`].
///
/// Interfaces are kept in declaration order. A declaration that couldn't be
/// used still takes its slot, so that later interface ids keep pointing to
/// the right interface. Both are reset by every new section.
///
/// It is maintained by the [`BlockReader`].
pub struct PcapNgState<F: TraceDecoderFactory> {
    /// Current section of the pcapng, `None` before the first valid one
    pub(crate) section: Option<SectionHeaderBlock<'static>>,
    /// Interfaces of the current section
    pub(crate) interfaces: Vec<Option<Interface<F>>>,
}

impl<F: TraceDecoderFactory> Default for PcapNgState<F> {
    fn default() -> Self {
        PcapNgState { section: None, interfaces: Vec::new() }
    }
}

impl<F: TraceDecoderFactory> PcapNgState<F> {
    /// Endianness of the current section, if any.
    pub fn endianness(&self) -> Option<Endianness> {
        self.section.as_ref().map(|section| section.endianness)
    }

    /// Starts a new section, dropping every interface of the previous one.
    ///
    /// `None` means the Section Header Block was invalid: no block is decoded
    /// until a valid one is seen.
    pub(crate) fn start_section(&mut self, section: Option<SectionHeaderBlock<'static>>) {
        self.section = section;
        self.interfaces.clear();
    }

    /// Declares the next interface, returning its id.
    pub(crate) fn push_interface(&mut self, interface: Option<Interface<F>>) -> u32 {
        self.interfaces.push(interface);
        (self.interfaces.len() - 1) as u32
    }

    /// The interface with the given id, `None` if out of range or unusable.
    pub(crate) fn interface_mut(&mut self, interface_id: u32) -> Option<&mut Interface<F>> {
        self.interfaces.get_mut(interface_id as usize).and_then(Option::as_mut)
    }

    /// Decode a timestamp using the resolution of the interface.
    pub(crate) fn decode_timestamp(&self, interface_id: u32, ts_raw: u64) -> Option<Duration> {
        let interface = self.interfaces.get(interface_id as usize)?.as_ref()?;
        Some(interface.description.ts_resolution.to_duration(ts_raw))
    }
}

//! Contains the PcapNg blocks.

pub(crate) mod block_common;
pub mod enhanced_packet;
pub mod interface_description;
pub mod opt_common;
pub mod section_header;

pub use block_common::*;
pub use enhanced_packet::EnhancedPacketBlock;
pub use interface_description::{InterfaceDescriptionBlock, TsResolution};
pub use opt_common::{OptionScope, OptionValue, PcapOption, PcapOptions};
pub use section_header::SectionHeaderBlock;

/// Section Header Block type
pub const SECTION_HEADER_BLOCK: u32 = 0x0A0D0D0A;
/// Interface Description Block type
pub const INTERFACE_DESCRIPTION_BLOCK: u32 = 0x00000001;
/// Enhanced Packet Block type
pub const ENHANCED_PACKET_BLOCK: u32 = 0x00000006;

//! Contains the PcapNg block parsers, the block reader and the streaming decoder.

pub mod blocks;

mod decoder;
mod reader;
mod state;
mod stream;

pub use blocks::*;
pub use decoder::*;
pub use reader::*;
pub use state::*;
pub use stream::*;

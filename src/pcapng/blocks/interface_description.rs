//! Interface Description Block (IDB).

use std::time::Duration;

use derive_into_owned::IntoOwned;

use super::opt_common::{OptionScope, PcapOptions};
use crate::errors::FormatError;
use crate::{Endianness, LinkType};

use super::INTERFACE_DESCRIPTION_BLOCK;

//   0                   1                   2                   3
//   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//  +---------------------------------------------------------------+
//  |                    Block Type = 0x00000001                    |
//  +---------------------------------------------------------------+
//  |                      Block Total Length                       |
//  +---------------------------------------------------------------+
//  |           LinkType            |           Reserved            |
//  +---------------------------------------------------------------+
//  |                            SnapLen                            |
//  +---------------------------------------------------------------+
//  /                      Options (variable)                       /
//  +---------------------------------------------------------------+
//  |                      Block Total Length                       |
//  +---------------------------------------------------------------+
/// An Interface Description Block (IDB) is the container for information describing an interface
/// on which packet data is captured.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct InterfaceDescriptionBlock<'a> {
    /// Link layer type of the interface.
    pub link_type: LinkType,

    /// Maximum number of octets captured from each packet.
    pub snap_len: u32,

    /// Resolution of the timestamps of the packets captured on this interface.
    ///
    /// Taken from the first valid `if_tsresol` option, microseconds otherwise.
    pub ts_resolution: TsResolution,

    /// Options
    pub options: PcapOptions<'a>,
}

impl<'a> InterfaceDescriptionBlock<'a> {
    /// Fixed part of the block, including the generic header and trailer.
    pub const MIN_LEN: usize = 20;

    /// Parses an Interface Description Block.
    ///
    /// `block` holds the whole block, its framing has already been validated.
    pub fn from_slice(block: &'a [u8], endianness: Endianness) -> Result<Self, FormatError> {
        if block.len() < Self::MIN_LEN {
            return Err(FormatError::BodyTooShort {
                block_type: INTERFACE_DESCRIPTION_BLOCK,
                length: block.len() as u32,
                minimum: Self::MIN_LEN as u32,
            });
        }

        let raw_link_type = endianness.read_u16(&block[8..]);
        let link_type = LinkType::from_raw(raw_link_type).ok_or(FormatError::UnsupportedLinkType(raw_link_type))?;

        let snap_len = endianness.read_u32(&block[12..]);
        if snap_len == 0 {
            return Err(FormatError::ZeroSnapLength);
        }

        let options = PcapOptions::from_slice(&block[16..block.len() - 4], OptionScope::InterfaceDescription, endianness)?;
        let ts_resolution = options.ts_resolution().unwrap_or_default();

        Ok(InterfaceDescriptionBlock { link_type, snap_len, ts_resolution, options })
    }
}


/* ----- TsResolution ----- */

/// Resolution of the timestamps of an interface, from the `if_tsresol` option.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TsResolution {
    /// Units of 10^-n seconds, n <= 9
    Decimal(u8),
    /// Units of 2^-n seconds, n <= 32
    Binary(u8),
}

impl Default for TsResolution {
    /// Microseconds
    fn default() -> Self {
        TsResolution::Decimal(6)
    }
}

impl TsResolution {
    /// Nanoseconds
    pub const NANO: TsResolution = TsResolution::Decimal(9);

    /// Reads the raw `if_tsresol` value, `None` if the resolution is not supported.
    pub fn from_raw(raw: u8) -> Option<Self> {
        let exponent = raw & 0x7F;
        if raw & 0x80 != 0 {
            (exponent <= 32).then_some(TsResolution::Binary(exponent))
        }
        else {
            (exponent <= 9).then_some(TsResolution::Decimal(exponent))
        }
    }

    /// Raw `if_tsresol` value.
    pub fn to_raw(self) -> u8 {
        match self {
            TsResolution::Decimal(n) => n,
            TsResolution::Binary(n) => 0x80 | n,
        }
    }

    /// Converts a raw timestamp in units of this resolution into a duration since the Unix epoch.
    pub fn to_duration(self, ts: u64) -> Duration {
        match self {
            TsResolution::Decimal(n) => {
                let units = 10_u64.pow(n as u32);
                let nanos = (ts % units) * 10_u64.pow(9 - n as u32);
                Duration::new(ts / units, nanos as u32)
            },
            TsResolution::Binary(n) => {
                let frac = ts & ((1_u64 << n) - 1);
                let nanos = (frac as u128 * 1_000_000_000) >> n;
                Duration::new(ts >> n, nanos as u32)
            },
        }
    }
}

//! Options shared by the Section Header and Interface Description blocks.

use std::borrow::Cow;

use derive_into_owned::IntoOwned;
use log::trace;

use super::interface_description::TsResolution;
use crate::errors::FormatError;
use crate::Endianness;

/// opt_endofopt
pub const OPT_END_OF_OPT: u16 = 0;
/// opt_comment
pub const OPT_COMMENT: u16 = 1;

/// shb_hardware
pub const SHB_HARDWARE: u16 = 2;
/// shb_os
pub const SHB_OS: u16 = 3;
/// shb_userappl
pub const SHB_USER_APPL: u16 = 4;

/// if_name
pub const IF_NAME: u16 = 2;
/// if_description
pub const IF_DESCRIPTION: u16 = 3;
/// if_speed
pub const IF_SPEED: u16 = 8;
/// if_tsresol
pub const IF_TS_RESOL: u16 = 9;
/// if_os
pub const IF_OS: u16 = 12;
/// if_fcslen
pub const IF_FCS_LEN: u16 = 13;
/// if_hardware
pub const IF_HARDWARE: u16 = 15;
/// if_txspeed
pub const IF_TX_SPEED: u16 = 16;
/// if_rxspeed
pub const IF_RX_SPEED: u16 = 17;

/// Block owning an options area, the meaning of a code depends on it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OptionScope {
    /// Options of a Section Header Block
    SectionHeader,
    /// Options of an Interface Description Block
    InterfaceDescription,
}

/// Decoded value of an option.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub enum OptionValue<'a> {
    /// UTF-8 string, trailing NUL bytes removed
    Utf8(Cow<'a, str>),
    /// Speed in bits per second
    Speed(u64),
    /// Resolution of the interface timestamps
    TsResolution(TsResolution),
    /// Length of the Frame Check Sequence in bits
    FcsLength(u8),
    /// Unknown option, or a known option whose value is malformed
    Raw(Cow<'a, [u8]>),
}

/// A single TLV option.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct PcapOption<'a> {
    /// Option code
    pub code: u16,
    /// Option value
    pub value: OptionValue<'a>,
}

impl<'a> PcapOption<'a> {
    /// Decodes the value of an option. Never fails: a value that can't be
    /// decoded for its code is kept as [`OptionValue::Raw`].
    pub fn from_slice(scope: OptionScope, code: u16, value: &'a [u8], endianness: Endianness) -> Self {
        let decoded = match (scope, code) {
            (_, OPT_COMMENT) => utf8(value),
            (OptionScope::SectionHeader, SHB_HARDWARE | SHB_OS | SHB_USER_APPL) => utf8(value),
            (OptionScope::InterfaceDescription, IF_NAME | IF_DESCRIPTION | IF_OS | IF_HARDWARE) => utf8(value),
            (OptionScope::InterfaceDescription, IF_SPEED | IF_TX_SPEED | IF_RX_SPEED) if value.len() == 8 => {
                Some(OptionValue::Speed(endianness.read_u64(value)))
            },
            (OptionScope::InterfaceDescription, IF_TS_RESOL) if value.len() == 1 => {
                TsResolution::from_raw(value[0]).map(OptionValue::TsResolution)
            },
            (OptionScope::InterfaceDescription, IF_FCS_LEN) if value.len() == 1 => Some(OptionValue::FcsLength(value[0])),
            _ => {
                trace!("{scope:?}: unknown option {code}, length {}", value.len());
                None
            },
        };

        let value = decoded.unwrap_or(OptionValue::Raw(Cow::Borrowed(value)));
        PcapOption { code, value }
    }
}

fn utf8(value: &[u8]) -> Option<OptionValue<'_>> {
    let end = value.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    std::str::from_utf8(&value[..end]).ok().map(|s| OptionValue::Utf8(Cow::Borrowed(s)))
}

//   0                   1                   2                   3
//   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |      Option Code              |         Option Length         |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  /                       Option Value                            /
//  /              variable length, padded to 32 bits               /
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// Options of a block, decoded once and read-only afterwards.
#[derive(Clone, Debug, Default, IntoOwned, Eq, PartialEq)]
pub struct PcapOptions<'a> {
    options: Vec<PcapOption<'a>>,
}

impl<'a> PcapOptions<'a> {
    /// Parses the options area of a block.
    ///
    /// Parsing stops at `opt_endofopt`, or when the padding of the last option is
    /// missing. An option declaring more bytes than available is an error.
    pub fn from_slice(mut slice: &'a [u8], scope: OptionScope, endianness: Endianness) -> Result<Self, FormatError> {
        let mut options = vec![];

        while slice.len() >= 4 {
            let code = endianness.read_u16(slice);
            let length = endianness.read_u16(&slice[2..]);

            let value_end = 4 + length as usize;
            if slice.len() < value_end {
                return Err(FormatError::TruncatedOption { code, length, remaining: slice.len() - 4 });
            }

            if code == OPT_END_OF_OPT {
                break;
            }

            options.push(PcapOption::from_slice(scope, code, &slice[4..value_end], endianness));

            let padded_end = (value_end + 3) & !3;
            if slice.len() < padded_end {
                break;
            }
            slice = &slice[padded_end..];
        }

        Ok(PcapOptions { options })
    }

    /// Number of options, `opt_endofopt` excluded.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if the block has no option.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options in the order of the block.
    pub fn iter(&self) -> impl Iterator<Item = &PcapOption<'a>> {
        self.options.iter()
    }

    /// First option with the given code.
    pub fn get(&self, code: u16) -> Option<&PcapOption<'a>> {
        self.options.iter().find(|opt| opt.code == code)
    }

    /// Returns true if an option with the given code is present.
    pub fn contains(&self, code: u16) -> bool {
        self.get(code).is_some()
    }

    /// First string option with the given code.
    pub fn string(&self, code: u16) -> Option<&str> {
        self.options.iter().find_map(|opt| match &opt.value {
            OptionValue::Utf8(s) if opt.code == code => Some(s.as_ref()),
            _ => None,
        })
    }

    /// First valid `if_tsresol` option.
    pub fn ts_resolution(&self) -> Option<TsResolution> {
        self.options.iter().find_map(|opt| match opt.value {
            OptionValue::TsResolution(res) => Some(res),
            _ => None,
        })
    }
}

//! TECMP (Technically Enhanced Capture Module Protocol) frames carrying captured Ethernet frames.

use thiserror::Error;

use crate::common::be_u16;

/// Ethertype of TECMP.
pub const ETHERTYPE_TECMP: u16 = 0x99FE;
/// Legacy ethertype of TECMP.
pub const ETHERTYPE_TECMP_LEGACY: u16 = 0x2090;

/// Supported protocol version.
pub const TECMP_VERSION: u8 = 3;
/// Message type of a log stream.
pub const MESSAGE_TYPE_LOG_STREAM: u8 = 3;
/// Data type of captured Ethernet frames.
pub const DATA_TYPE_ETHERNET: u16 = 0x0080;

/// Length of the TECMP header following the ethertype.
pub const HEADER_LEN: usize = 12;
/// Length of the header of each payload record.
pub const RECORD_HEADER_LEN: usize = 16;

const SEGMENTATION_MASK: u16 = 0x0003;
const UNSEGMENTED: u16 = 0x0003;

/// Reasons a TECMP frame is ignored.
#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
pub enum TecmpError {
    /// The frame can't hold a header and one record header.
    #[error("TECMP frame too short: {0}B")]
    TooShort(usize),
    /// The protocol version is not supported.
    #[error("TECMP version {0} unsupported")]
    UnsupportedVersion(u8),
    /// The message is not a log stream.
    #[error("TECMP message type {0} unsupported")]
    UnsupportedMessageType(u8),
    /// The records are not captured Ethernet frames.
    #[error("TECMP data type {0:#06x} unsupported")]
    UnsupportedDataType(u16),
    /// The message is a segment of a bigger message.
    #[error("TECMP segmented message unsupported, flags {0:#06x}")]
    Segmented(u16),
}

//   0                   1                   2                   3
//   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |           Device ID           |            Counter            |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |    Version    | Message Type  |           Data Type           |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |           Reserved            |         Device Flags          |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  /                     Payload records ...                       /
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// A validated TECMP log stream of captured Ethernet frames.
#[derive(Clone, Debug)]
pub struct TecmpFrame<'a> {
    /// Capture module that sent the frame
    pub device_id: u16,
    /// Message counter
    pub counter: u16,
    /// Device flags
    pub device_flags: u16,
    records: &'a [u8],
}

impl<'a> TecmpFrame<'a> {
    /// Parses the TECMP header, `slice` starting after the ethertype.
    pub fn from_slice(slice: &'a [u8]) -> Result<Self, TecmpError> {
        if slice.len() < HEADER_LEN + RECORD_HEADER_LEN {
            return Err(TecmpError::TooShort(slice.len()));
        }

        let version = slice[4];
        if version != TECMP_VERSION {
            return Err(TecmpError::UnsupportedVersion(version));
        }

        let message_type = slice[5];
        if message_type != MESSAGE_TYPE_LOG_STREAM {
            return Err(TecmpError::UnsupportedMessageType(message_type));
        }

        let data_type = be_u16(slice, 6).unwrap_or_default();
        if data_type != DATA_TYPE_ETHERNET {
            return Err(TecmpError::UnsupportedDataType(data_type));
        }

        let device_flags = be_u16(slice, 10).unwrap_or_default();
        if device_flags & SEGMENTATION_MASK != UNSEGMENTED {
            return Err(TecmpError::Segmented(device_flags));
        }

        Ok(TecmpFrame {
            device_id: be_u16(slice, 0).unwrap_or_default(),
            counter: be_u16(slice, 2).unwrap_or_default(),
            device_flags,
            records: &slice[HEADER_LEN..],
        })
    }

    /// Iterates over the complete payload records.
    pub fn records(&self) -> TecmpRecords<'a> {
        TecmpRecords { remaining: self.records, offset: HEADER_LEN }
    }
}

/// A payload record: a captured Ethernet frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TecmpRecord<'a> {
    /// Offset of the captured frame from the start of the TECMP header
    pub offset: usize,
    /// Capture interface of the module
    pub interface_id: u32,
    /// Capture timestamp of the module
    pub timestamp: u64,
    /// Data flags
    pub data_flags: u16,
    /// The captured Ethernet frame
    pub frame: &'a [u8],
}

/// Iterator over the records of a [`TecmpFrame`].
///
/// Stops at the first incomplete record.
#[derive(Clone, Debug)]
pub struct TecmpRecords<'a> {
    remaining: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for TecmpRecords<'a> {
    type Item = TecmpRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.remaining.get(..RECORD_HEADER_LEN)?;
        let interface_id = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let timestamp = u64::from_be_bytes([header[4], header[5], header[6], header[7], header[8], header[9], header[10], header[11]]);
        let length = be_u16(header, 12)? as usize;
        let data_flags = be_u16(header, 14)?;

        let frame = self.remaining.get(RECORD_HEADER_LEN..RECORD_HEADER_LEN + length)?;
        let record = TecmpRecord { offset: self.offset + RECORD_HEADER_LEN, interface_id, timestamp, data_flags, frame };

        self.remaining = &self.remaining[RECORD_HEADER_LEN + length..];
        self.offset += RECORD_HEADER_LEN + length;
        Some(record)
    }
}

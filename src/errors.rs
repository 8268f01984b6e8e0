use thiserror::Error;

/* ----- enum PcapError ----- */

/// Errors that can cross the boundary of the decoder.
#[derive(Debug, Error)]
pub enum PcapError {
    /// The capture is corrupted, the decoder can't make progress anymore.
    ///
    /// Once returned, the same error is returned by every following call.
    #[error("Corrupt capture format at offset {position:#x}")]
    CorruptFormat {
        /// Stream position of the block that failed
        position: u64,
        /// What was wrong with the block
        #[source]
        reason: FormatError,
    },
    /// An I/O error occurred while reading the capture.
    #[error("I/O error while reading the capture")]
    ReadFailed(#[source] std::io::Error),
}

impl PcapError {
    /// Returns the reason of the corruption, if any.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            PcapError::CorruptFormat { reason, .. } => Some(reason),
            PcapError::ReadFailed(_) => None,
        }
    }
}

impl From<std::io::Error> for PcapError {
    fn from(err: std::io::Error) -> Self {
        PcapError::ReadFailed(err)
    }
}


/* ----- enum FormatError ----- */

/// Errors that can occur while validating the framing of a PcapNg block.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FormatError {
    /// The buffer doesn't hold the whole block.
    /// # Fields
    /// - 0: needed size
    /// - 1: actual size of the buffer
    #[error("The buffer too small: need {0}B, got {1}B")]
    IncompleteBlock(usize, usize),
    /// The block declares a length of zero.
    #[error("Block: length == 0")]
    ZeroLength,
    /// The block declares a length below the generic block size.
    #[error("Block: length < 12: {0}")]
    BlockTooShort(u32),
    /// The block is too short for its type.
    #[error("Block {block_type:#X}: length {length} < {minimum}")]
    BodyTooShort {
        /// Type of the block
        block_type: u32,
        /// Declared length
        length: u32,
        /// Minimum length for this type
        minimum: u32,
    },
    /// The leading and trailing lengths differ.
    #[error("Block: initial_length != trailer_length: {0} != {1}")]
    LengthMismatch(u32, u32),
    /// The byte-order magic of a Section Header Block is invalid.
    #[error("SectionHeaderBlock: invalid byte-order magic: {0:#X}")]
    InvalidByteOrderMagic(u32),
    /// The version of a Section Header Block is not 1.0.
    #[error("SectionHeaderBlock: unsupported version {0}.{1}")]
    UnsupportedVersion(u16, u16),
    /// The link type of an Interface Description Block is not supported.
    #[error("InterfaceDescriptionBlock: unsupported link type {0}")]
    UnsupportedLinkType(u16),
    /// The snap length of an Interface Description Block is zero.
    #[error("InterfaceDescriptionBlock: snap_len == 0")]
    ZeroSnapLength,
    /// A block other than a Section Header Block precedes any valid section.
    #[error("Block {0:#X} precedes the first valid SectionHeaderBlock")]
    MissingSectionHeader(u32),
    /// An option declares more bytes than remain in the block.
    #[error("Option {code}: length {length} > remaining {remaining}B")]
    TruncatedOption {
        /// Code of the option
        code: u16,
        /// Declared length
        length: u16,
        /// Bytes remaining in the options area
        remaining: usize,
    },
}

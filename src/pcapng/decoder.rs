use log::{debug, warn};

use super::blocks::{BlockHeader, ENHANCED_PACKET_BLOCK, MIN_BLOCK_LEN};
use super::BlockReader;
use crate::config::DecoderConfig;
use crate::errors::{FormatError, PcapError};
use crate::trace::{LineOf, TraceDecoderFactory};

/// Streaming decoder of a PcapNg capture.
///
/// The capture can be fed in chunks of any size, blocks spanning several chunks are
/// buffered. Blocks bigger than the buffer capacity are skipped.
///
/// A corrupted capture stops the decoding: the call detecting the corruption returns the
/// lines decoded before it, every following call returns [`PcapError::CorruptFormat`].
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::File;
/// use std::io::Read;
/// use pcapng_payload::pcapng::PcapNgDecoder;
/// use pcapng_payload::PayloadDecoderFactory;
///
/// let mut file = File::open("test.pcapng").expect("Error opening file");
/// let mut decoder = PcapNgDecoder::new(PayloadDecoderFactory);
///
/// let mut chunk = [0_u8; 4096];
/// let mut position = 0;
/// loop {
///     let len = file.read(&mut chunk).unwrap();
///     if len == 0 {
///         break;
///     }
///
///     for line in decoder.decode(&chunk[..len], position).unwrap() {
///         println!("{:x} {:?}", line.position, line.data);
///     }
///     position += len as u64;
/// }
/// decoder.flush().unwrap();
/// ```
pub struct PcapNgDecoder<F: TraceDecoderFactory> {
    reader: BlockReader<F>,
    capacity: usize,
    buffer: Vec<u8>,
    header: Option<BlockHeader>,
    block_position: u64,
    discard: usize,
    corrupted: Option<(u64, FormatError)>,
}

impl<F: TraceDecoderFactory> PcapNgDecoder<F> {
    /// Creates a new decoder with the default configuration.
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, DecoderConfig::default())
    }

    /// Creates a new decoder.
    pub fn with_config(factory: F, config: DecoderConfig) -> Self {
        let capacity = config.buffer_capacity.max(MIN_BLOCK_LEN);
        PcapNgDecoder {
            reader: BlockReader::with_config(factory, config),
            capacity,
            buffer: Vec::with_capacity(capacity),
            header: None,
            block_position: 0,
            discard: 0,
            corrupted: None,
        }
    }

    /// Returns the block reader, with the state of the current section.
    pub fn reader(&self) -> &BlockReader<F> {
        &self.reader
    }

    /// Returns true once the capture was found corrupted.
    pub fn is_corrupted(&self) -> bool {
        self.corrupted.is_some()
    }

    fn corrupt_error(&self) -> Option<PcapError> {
        self.corrupted.as_ref().map(|(position, reason)| PcapError::CorruptFormat { position: *position, reason: reason.clone() })
    }

    fn set_corrupted(&mut self, reason: FormatError) {
        warn!("Corrupt capture at {:#x}: {reason}", self.block_position);
        self.corrupted = Some((self.block_position, reason));
        self.buffer.clear();
        self.header = None;
    }

    /// Decodes the next chunk of the capture.
    ///
    /// `position` is the offset of the first byte of `chunk` in the stream.
    pub fn decode(&mut self, mut chunk: &[u8], mut position: u64) -> Result<Vec<LineOf<F>>, PcapError> {
        if let Some(err) = self.corrupt_error() {
            return Err(err);
        }

        let mut lines = Vec::new();
        while !chunk.is_empty() {
            if self.discard > 0 {
                let len = self.discard.min(chunk.len());
                self.discard -= len;
                chunk = &chunk[len..];
                position += len as u64;
                continue;
            }

            if self.buffer.is_empty() {
                self.block_position = position;
            }

            let header = match self.header {
                Some(header) => header,
                None => {
                    // Assemble the generic header first
                    let len = (MIN_BLOCK_LEN - self.buffer.len()).min(chunk.len());
                    self.buffer.extend_from_slice(&chunk[..len]);
                    chunk = &chunk[len..];
                    position += len as u64;

                    if self.buffer.len() < MIN_BLOCK_LEN {
                        break;
                    }

                    let header = match self.reader.peek_header(&self.buffer) {
                        Ok(header) => header,
                        Err(err) => {
                            self.set_corrupted(err);
                            break;
                        },
                    };

                    let length = header.length as usize;
                    if length == 0 {
                        self.set_corrupted(FormatError::ZeroLength);
                        break;
                    }
                    if length < MIN_BLOCK_LEN {
                        self.set_corrupted(FormatError::BlockTooShort(header.length));
                        break;
                    }

                    if length > self.capacity {
                        debug!(
                            "Skipping block {:#X} at {:#x}: {length}B > {}B",
                            header.block_type, self.block_position, self.capacity
                        );
                        self.discard = length - self.buffer.len();
                        self.buffer.clear();
                        continue;
                    }

                    self.header = Some(header);
                    header
                },
            };

            let missing = header.length as usize - self.buffer.len();
            let len = missing.min(chunk.len());
            self.buffer.extend_from_slice(&chunk[..len]);
            chunk = &chunk[len..];
            position += len as u64;

            if self.buffer.len() < header.length as usize {
                break;
            }

            let result = if header.block_type == ENHANCED_PACKET_BLOCK {
                self.reader.decode_block(&self.buffer, self.block_position).map(|block_lines| lines.extend(block_lines))
            }
            else {
                self.reader.parse_block(&self.buffer, self.block_position).map(|_| ())
            };

            self.buffer.clear();
            self.header = None;

            if let Err(err) = result {
                self.set_corrupted(err);
                break;
            }
        }

        Ok(lines)
    }

    /// Ends the decoding of the buffered data.
    ///
    /// No line is kept by this decoder, the result is always empty unless corrupted.
    pub fn flush(&mut self) -> Result<Vec<LineOf<F>>, PcapError> {
        match self.corrupt_error() {
            Some(err) => Err(err),
            None => Ok(Vec::new()),
        }
    }
}

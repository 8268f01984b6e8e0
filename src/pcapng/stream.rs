use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use super::PcapNgDecoder;
use crate::config::DecoderConfig;
use crate::errors::PcapError;
use crate::trace::{LineOf, TraceDecoderFactory};

const DEFAULT_CHUNK_LEN: usize = 64 * 1024;

/// Wraps another reader and uses it to decode a PcapNg capture.
///
/// It implements the Iterator trait in order to return the decoded lines one at a time.
/// The iteration ends after the first error.
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::File;
/// use pcapng_payload::pcapng::PcapNgStreamReader;
/// use pcapng_payload::PayloadDecoderFactory;
///
/// let file_in = File::open("test.pcapng").expect("Error opening file");
/// let reader = PcapNgStreamReader::new(file_in, PayloadDecoderFactory);
///
/// for line in reader {
///     let line = line.unwrap();
///     println!("{:?} {:?}", line.timestamp, line.data);
/// }
/// ```
pub struct PcapNgStreamReader<R: Read, F: TraceDecoderFactory> {
    reader: R,
    decoder: PcapNgDecoder<F>,
    chunk: Vec<u8>,
    position: u64,
    lines: VecDeque<LineOf<F>>,
    finished: bool,
}

impl<R: Read, F: TraceDecoderFactory> PcapNgStreamReader<R, F> {
    /// Creates a new reader with the default configuration.
    pub fn new(reader: R, factory: F) -> Self {
        Self::with_config(reader, factory, DecoderConfig::default())
    }

    /// Creates a new reader.
    pub fn with_config(reader: R, factory: F, config: DecoderConfig) -> Self {
        PcapNgStreamReader {
            reader,
            decoder: PcapNgDecoder::with_config(factory, config),
            chunk: vec![0_u8; DEFAULT_CHUNK_LEN],
            position: 0,
            lines: VecDeque::new(),
            finished: false,
        }
    }

    /// Returns the underlying decoder.
    pub fn decoder(&self) -> &PcapNgDecoder<F> {
        &self.decoder
    }

    /// Consumes the [`PcapNgStreamReader`], returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill(&mut self) -> Result<(), PcapError> {
        let len = loop {
            match self.reader.read(&mut self.chunk) {
                Ok(len) => break len,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(PcapError::ReadFailed(err)),
            }
        };

        if len == 0 {
            self.finished = true;
            self.lines.extend(self.decoder.flush()?);
            return Ok(());
        }

        let lines = self.decoder.decode(&self.chunk[..len], self.position)?;
        self.lines.extend(lines);
        self.position += len as u64;
        Ok(())
    }
}

impl<R: Read, F: TraceDecoderFactory> Iterator for PcapNgStreamReader<R, F> {
    type Item = Result<LineOf<F>, PcapError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.lines.pop_front() {
                return Some(Ok(line));
            }

            if self.finished {
                return None;
            }

            if let Err(err) = self.fill() {
                self.finished = true;
                return Some(Err(err));
            }
        }
    }
}

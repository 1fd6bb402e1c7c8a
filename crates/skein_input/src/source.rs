//! Streaming a [`Read`] implementation through a driver.

use std::io::{self, Read};

use skein_parse::{Driver, Observer, ParseError, Parser};
use tracing::{debug, trace};

use crate::decode::{DecodeError, Utf8Decoder};

/// Default read size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// How a [`ReaderSource`] reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    /// Bytes requested per `read` call.
    pub chunk_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl SourceConfig {
    /// Config with the given chunk size (at least one byte).
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }
}

/// Anything that can stop a reader-driven parse.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Parse(#[from] ParseError<char>),
}

/// Pulls UTF-8 text from a reader and feeds it to a driver chunk by chunk.
pub struct ReaderSource<R> {
    reader: R,
    config: SourceConfig,
    decoder: Utf8Decoder,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, SourceConfig::default())
    }

    pub fn with_config(reader: R, config: SourceConfig) -> Self {
        Self {
            reader,
            config: SourceConfig::with_chunk_size(config.chunk_size),
            decoder: Utf8Decoder::new(),
        }
    }

    /// Read to end of stream, collecting every output the driver produces.
    ///
    /// Stops at the first error. The driver is left finished on success and
    /// aborted after a parse error, so its observer can be inspected.
    pub fn run<P, H>(mut self, driver: &mut Driver<P, H>) -> Result<Vec<P::Output>, SourceError>
    where
        P: Parser<Input = char>,
        H: Observer<char, P::Output>,
    {
        let mut outputs = Vec::new();
        let mut bytes = vec![0; self.config.chunk_size];
        let mut chars = Vec::new();

        loop {
            let read = match self.reader.read(&mut bytes) {
                Ok(0) => break,
                Ok(read) => read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            };
            chars.clear();
            self.decoder.decode_into(&bytes[..read], &mut chars)?;
            trace!(bytes = read, chars = chars.len(), "chunk");
            for output in driver.feed(chars.drain(..))? {
                outputs.push(output?);
            }
        }

        self.decoder.finish()?;
        debug!(bytes = self.decoder.decoded(), "reader exhausted");
        for output in driver.finish()? {
            outputs.push(output?);
        }
        Ok(outputs)
    }
}

/// Parse everything `reader` yields with a fresh driver.
pub fn parse_reader<P, R>(parser: P, reader: R) -> Result<Vec<P::Output>, SourceError>
where
    P: Parser<Input = char>,
    R: Read,
{
    ReaderSource::new(reader).run(&mut Driver::new(parser))
}

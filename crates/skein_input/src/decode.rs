//! Incremental UTF-8 decoding.
//!
//! Readers hand out byte chunks with no regard for character boundaries.
//! [`Utf8Decoder`] holds back an incomplete trailing sequence (at most three
//! bytes) and prepends it to the next chunk.

use std::fmt;

/// Kind of decoding problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// Bytes that can never start or continue a UTF-8 sequence.
    Invalid,
    /// The stream ended inside a multi-byte sequence.
    Truncated,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::Invalid => f.write_str("invalid UTF-8"),
            DecodeErrorKind::Truncated => f.write_str("truncated UTF-8 sequence"),
        }
    }
}

/// A byte range of the stream that is not valid UTF-8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at byte {offset} ({len} bytes)")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    /// Byte offset from the start of the stream.
    pub offset: usize,
    pub len: usize,
}

/// Decodes a byte stream chunk by chunk.
#[derive(Clone, Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
    decoded: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes decoded into characters so far.
    pub fn decoded(&self) -> usize {
        self.decoded
    }

    /// Bytes held back waiting for the rest of their sequence.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Decode `chunk`, appending characters to `out`.
    pub fn decode_into(&mut self, chunk: &[u8], out: &mut Vec<char>) -> Result<(), DecodeError> {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let (valid, rest) = match std::str::from_utf8(&bytes) {
            Ok(text) => (text, &[][..]),
            Err(error) => {
                let (head, tail) = bytes.split_at(error.valid_up_to());
                if let Some(len) = error.error_len() {
                    return Err(DecodeError {
                        kind: DecodeErrorKind::Invalid,
                        offset: self.decoded + head.len(),
                        len,
                    });
                }
                let text = std::str::from_utf8(head).map_err(|_| DecodeError {
                    kind: DecodeErrorKind::Invalid,
                    offset: self.decoded,
                    len: head.len(),
                })?;
                (text, tail)
            }
        };

        out.extend(valid.chars());
        self.decoded += valid.len();
        self.pending = rest.to_vec();
        Ok(())
    }

    /// Decode `chunk` into a fresh vector.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<Vec<char>, DecodeError> {
        let mut out = Vec::with_capacity(chunk.len());
        self.decode_into(chunk, &mut out)?;
        Ok(out)
    }

    /// Signal end of stream; fails if a sequence was left incomplete.
    pub fn finish(&mut self) -> Result<(), DecodeError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let len = self.pending.len();
        self.pending.clear();
        Err(DecodeError {
            kind: DecodeErrorKind::Truncated,
            offset: self.decoded,
            len,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{DecodeError, DecodeErrorKind, Utf8Decoder};

    #[test]
    fn test_ascii_passes_through() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"abc").unwrap(), vec!['a', 'b', 'c']);
        assert_eq!(decoder.decoded(), 3);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_sequence_split_across_chunks() {
        let bytes = "é€".as_bytes();
        let mut decoder = Utf8Decoder::new();
        let mut out = Vec::new();
        for byte in bytes {
            decoder.decode_into(std::slice::from_ref(byte), &mut out).unwrap();
        }
        assert_eq!(out, vec!['é', '€']);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_invalid_byte_reports_offset() {
        let mut decoder = Utf8Decoder::new();
        decoder.decode(b"ok").unwrap();
        assert_eq!(
            decoder.decode(b"x\xffy"),
            Err(DecodeError {
                kind: DecodeErrorKind::Invalid,
                offset: 3,
                len: 1
            })
        );
    }

    #[test]
    fn test_truncated_at_finish() {
        let mut decoder = Utf8Decoder::new();
        let euro = "€".as_bytes();
        assert_eq!(decoder.decode(&euro[..2]).unwrap(), Vec::<char>::new());
        let error = decoder.finish().unwrap_err();
        assert_eq!(error.kind, DecodeErrorKind::Truncated);
        assert_eq!(error.offset, 0);
        assert_eq!(error.len, 2);
        assert_eq!(error.to_string(), "truncated UTF-8 sequence at byte 0 (2 bytes)");
    }
}

//! Input collaborators for `skein_parse`.
//!
//! The engine knows nothing about text or I/O. This crate layers both on
//! top of it:
//!
//! - [`LineTracker`]: an observer that keeps a line/column [`Position`] in
//!   step with the driver's cursor, rollbacks included
//! - [`Utf8Decoder`]: incremental UTF-8 decoding across chunk boundaries
//! - [`ReaderSource`]: pulls chunks from any [`std::io::Read`] and streams
//!   them through a driver

mod decode;
mod position;
mod source;

pub use decode::{DecodeError, DecodeErrorKind, Utf8Decoder};
pub use position::{LineTracker, Position};
pub use source::{parse_reader, ReaderSource, SourceConfig, SourceError, DEFAULT_CHUNK_SIZE};

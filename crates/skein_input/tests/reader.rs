#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::io::{self, Read};

use pretty_assertions::assert_eq;
use skein_input::{
    parse_reader, DecodeErrorKind, LineTracker, Position, ReaderSource, SourceConfig, SourceError,
};
use skein_parse::{literal, satisfy, Driver, Parser};

fn word() -> impl Parser<Input = char, Output = String> {
    satisfy("letter", |c: &char| c.is_alphabetic())
        .at_least(1)
        .pair(literal('\n'))
        .map(|(letters, _)| letters.into_iter().collect())
}

/// Reader yielding at most `step` bytes per call, interrupting once.
struct Trickle<'a> {
    bytes: &'a [u8],
    step: usize,
    interrupted: bool,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.interrupted {
            self.interrupted = true;
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let n = self.step.min(buf.len()).min(self.bytes.len());
        buf[..n].copy_from_slice(&self.bytes[..n]);
        self.bytes = &self.bytes[n..];
        Ok(n)
    }
}

#[test]
fn parses_whole_reader() {
    let outputs = parse_reader(word(), "alpha\nbeta\n".as_bytes()).unwrap();
    assert_eq!(outputs, vec!["alpha".to_string(), "beta".to_string()]);
}

#[test]
fn multibyte_text_survives_tiny_chunks() {
    let text = "façade\nnaïve\nüber\n";
    let source = ReaderSource::with_config(
        Trickle {
            bytes: text.as_bytes(),
            step: 1,
            interrupted: false,
        },
        SourceConfig::with_chunk_size(1),
    );
    let outputs = source.run(&mut Driver::new(word())).unwrap();
    assert_eq!(outputs, vec!["façade", "naïve", "über"]);
}

#[test]
fn zero_chunk_size_is_clamped() {
    assert_eq!(SourceConfig::with_chunk_size(0).chunk_size, 1);
}

#[test]
fn invalid_utf8_is_reported() {
    let error = parse_reader(word(), &b"ab\xff\n"[..]).unwrap_err();
    let SourceError::Decode(decode) = error else {
        panic!("expected a decode error, got {error:?}");
    };
    assert_eq!(decode.kind, DecodeErrorKind::Invalid);
    assert_eq!(decode.offset, 2);
}

#[test]
fn truncated_stream_is_reported() {
    let bytes = "ab\n€".as_bytes();
    let error = parse_reader(word(), &bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(
        error,
        SourceError::Decode(decode) if decode.kind == DecodeErrorKind::Truncated
    ));
}

#[test]
fn parse_failure_position_from_tracker() {
    let mut driver = Driver::with_observer(word(), LineTracker::new());
    let error = ReaderSource::new("one\ntwo\nth3ee\n".as_bytes())
        .run(&mut driver)
        .unwrap_err();
    let SourceError::Parse(parse) = error else {
        panic!("expected a parse error, got {error:?}");
    };
    assert_eq!(parse.offset(), Some(10));
    assert_eq!(
        driver.observer().position(),
        Position {
            offset: 10,
            line: 3,
            column: 3
        }
    );
}

#[test]
fn tracker_position_unaffected_by_backtracking() {
    let line = literal('a')
        .pair(literal('b'))
        .map(|_| 1)
        .or(literal('a').pair(literal('\n')).map(|_| 2));
    let mut driver = Driver::with_observer(line, LineTracker::new());
    let outputs = ReaderSource::new("a\nab".as_bytes()).run(&mut driver).unwrap();
    assert_eq!(outputs, vec![2, 1]);
    assert_eq!(driver.observer().position().to_string(), "2:3");
    assert_eq!(driver.observer().pending(), 0);
}

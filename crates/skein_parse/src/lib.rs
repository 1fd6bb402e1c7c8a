//! Resumable parser combinators over streamed input.
//!
//! A [`Parser`] describes a grammar; each run of it is a [`Computation`], a
//! state machine that never touches the input directly. It suspends with a
//! [`Request`] (peek, consume, snapshot, rollback) and the [`Driver`]
//! resumes it with the answer. Because the driver holds all input state,
//! the same grammar parses a complete slice or a stream arriving in chunks,
//! and backtracking is a cursor reset into the driver's buffer.
//!
//! ```text
//! let digit = satisfy("digit", char::is_ascii_digit);
//! let number = digit.at_least(1).map(|ds| ds.into_iter().collect::<String>());
//! let numbers = parse_all(number.pair(literal(';')), "12;7;".chars())?;
//! ```
//!
//! # Modules
//!
//! - [`protocol`]: requests, responses, the `Computation` trait
//! - [`combinator`]: leaves, primitives and the combinator algebra
//! - [`Driver`]: buffering, sessions, streaming
//! - [`Observer`]: hooks for state that follows the cursor

mod config;
mod driver;
mod error;
mod hooks;
mod parser;
pub mod combinator;
pub mod protocol;

use std::sync::Once;

pub use combinator::{
    all, any, between, catch, choice, consume, consume_or_end, end, fatal, label, lazy, literal,
    map, noop, one_of, pattern, peek, peek_or_end, recover_with, repeat, rollback, satisfy,
    sequence, snapshot, then, AsText, Sequence,
};
pub use config::DriverConfig;
pub use driver::{parse_all, Driver, Outputs};
pub use error::{ErrorCode, Failure, FailureKind, ParseError, Severity, UsageError};
pub use hooks::{NoopObserver, Observer};
pub use parser::{BoxedParser, Parser};
pub use protocol::{Computation, Request, Response, Resumed, SessionId, SnapshotToken, Step};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debugging.
///
/// Safe to call multiple times; only the first call has an effect, and only
/// when `RUST_LOG` is set. Enable with `RUST_LOG=skein_parse=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

//! The driver: feeds input to repeated runs of a parser.
//!
//! The driver owns the parser, the observer and a buffer of input that is
//! still reachable by backtracking. Each *session* runs one fresh
//! computation from the committed offset until it completes; its output is
//! emitted and the consumed prefix is pruned. A new session then starts on
//! whatever input remains, so a parser for one record turns into a parser
//! for a stream of records.
//!
//! # Streaming
//!
//! Input arrives in chunks through [`Driver::feed`]. When a computation asks
//! for an item past the end of the buffer, the session *starves*: the
//! pending request stays unanswered and control returns to the caller. The
//! next chunk resumes it in place. After [`Driver::finish`] the same request
//! is answered with
//! [`Response::EndOfInput`](crate::protocol::Response::EndOfInput) instead.
//!
//! The observable result does not depend on where the input was split.
//!
//! # Failure
//!
//! Any error ends the driver: it is returned once from the output iterator,
//! and every later call fails with [`UsageError::Aborted`].

mod buffer;
mod session;


use std::fmt;

use tracing::{debug, trace};

use self::buffer::Buffer;
use self::session::{Resume, Session};
use crate::config::DriverConfig;
use crate::error::{ParseError, UsageError};
use crate::hooks::{NoopObserver, Observer};
use crate::parser::Parser;
use crate::protocol::{Computation, SessionId, Step};

/// Runs a parser over streamed input.
pub struct Driver<P: Parser, H = NoopObserver> {
    parser: P,
    observer: H,
    config: DriverConfig,
    buffer: Buffer<P::Input>,
    session: Option<Session<P::Computation>>,
    next_session: u64,
    finished: bool,
    aborted: bool,
}

impl<P: Parser> Driver<P> {
    /// Create a driver with no observer and default configuration.
    pub fn new(parser: P) -> Self {
        Self::with_observer(parser, NoopObserver)
    }

    /// Create a driver with no observer.
    pub fn with_config(parser: P, config: DriverConfig) -> Self {
        Self::new(parser).configure(config)
    }
}

impl<P: Parser, H> Driver<P, H> {
    /// Create a driver that reports protocol events to `observer`.
    pub fn with_observer(parser: P, observer: H) -> Self {
        Self {
            parser,
            observer,
            config: DriverConfig::default(),
            buffer: Buffer::new(),
            session: None,
            next_session: 0,
            finished: false,
            aborted: false,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn configure(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The observer receiving protocol events.
    pub fn observer(&self) -> &H {
        &self.observer
    }

    /// Mutable access to the observer, e.g. to reset it between inputs.
    pub fn observer_mut(&mut self) -> &mut H {
        &mut self.observer
    }

    /// Consume the driver, returning its observer.
    pub fn into_observer(self) -> H {
        self.observer
    }

    /// Number of items retained for the active or next session.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Offset of the first uncommitted item.
    pub fn committed(&self) -> usize {
        self.buffer.start()
    }

    /// Whether end of input has been declared.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether an earlier error ended the driver.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl<P, H> Driver<P, H>
where
    P: Parser,
    P::Input: Clone + fmt::Debug,
    H: Observer<P::Input, P::Output>,
{
    /// Append a chunk of input and process as far as it allows.
    pub fn feed<T>(&mut self, items: T) -> Result<Outputs<'_, P, H>, ParseError<P::Input>>
    where
        T: IntoIterator<Item = P::Input>,
    {
        self.check_usable()?;
        if self.finished {
            return Err(UsageError::InputFinished.into());
        }
        self.buffer.extend(items);
        trace!(buffered = self.buffer.len(), end = self.buffer.end(), "fed");

        let retained = self.buffer.len();
        if let Some(limit) = self.config.exceeded_limit(retained) {
            return Err(self.abort(ParseError::BufferOverflow { retained, limit }));
        }
        Ok(Outputs { driver: self })
    }

    /// Declare end of input and process what remains.
    ///
    /// Calling it twice is harmless; the second call only drains.
    pub fn finish(&mut self) -> Result<Outputs<'_, P, H>, ParseError<P::Input>> {
        self.check_usable()?;
        if !self.finished {
            trace!(end = self.buffer.end(), "input finished");
            self.finished = true;
        }
        Ok(Outputs { driver: self })
    }

    /// Single entry point: feed a chunk, finishing the input unless
    /// `streaming` is set.
    pub fn drive<T>(
        &mut self,
        items: T,
        streaming: bool,
    ) -> Result<Outputs<'_, P, H>, ParseError<P::Input>>
    where
        T: IntoIterator<Item = P::Input>,
    {
        if streaming {
            return self.feed(items);
        }
        drop(self.feed(items)?);
        self.finish()
    }

    /// Resume processing without new input.
    ///
    /// Useful after dropping an [`Outputs`] iterator early.
    pub fn outputs(&mut self) -> Outputs<'_, P, H> {
        Outputs { driver: self }
    }

    fn check_usable(&self) -> Result<(), ParseError<P::Input>> {
        if self.aborted {
            return Err(UsageError::Aborted.into());
        }
        Ok(())
    }

    /// Advance until one session completes, the engine starves, or an error
    /// ends the driver.
    fn next_output(&mut self) -> Option<Result<P::Output, ParseError<P::Input>>> {
        if self.aborted {
            return None;
        }
        loop {
            if self.session.is_none() && !self.start_session() {
                return None;
            }
            let session = self.session.as_mut()?;

            let response = match session.answer(&self.buffer, &mut self.observer, self.finished)
            {
                Ok(Resume::Start) => None,
                Ok(Resume::With(response)) => Some(response),
                Ok(Resume::Starved) => return None,
                Err(usage) => return Some(Err(self.abort(usage.into()))),
            };
            let fresh = session.is_fresh();

            let resumed = skein_stack::ensure_sufficient_stack(|| {
                session.computation_mut().resume(response)
            });
            match resumed {
                Ok(Step::Suspend(request)) => session.suspend(request),
                Ok(Step::Complete(output)) => {
                    let (id, start, cursor) = (session.id(), session.start(), session.cursor());
                    self.session = None;
                    return Some(self.complete(id, start, cursor, fresh, output));
                }
                Err(failure) => {
                    let cursor = session.cursor();
                    return Some(Err(self.abort(ParseError::failure(failure, cursor))));
                }
            }
        }
    }

    /// Start a session if one may start. Returns whether one is active.
    fn start_session(&mut self) -> bool {
        // Only the very first session may start on an empty buffer; later
        // ones wait for input so splitting the stream cannot add outputs.
        if self.next_session > 0 && self.buffer.is_empty() {
            return false;
        }
        let id = SessionId(self.next_session);
        self.next_session += 1;
        let start = self.buffer.start();
        trace!(session = %id, start, "session started");
        self.session = Some(Session::new(id, self.parser.computation(), start));
        true
    }

    fn complete(
        &mut self,
        id: SessionId,
        start: usize,
        cursor: usize,
        fresh: bool,
        output: P::Output,
    ) -> Result<P::Output, ParseError<P::Input>> {
        if fresh {
            return Err(self.abort(UsageError::NoConsumption.into()));
        }
        if cursor == start && self.buffer.end() > cursor {
            return Err(self.abort(UsageError::NoProgress { offset: cursor }.into()));
        }
        self.buffer.discard_before(cursor);
        self.observer.on_complete(&output);
        trace!(session = %id, start, end = cursor, retained = self.buffer.len(), "session completed");
        Ok(output)
    }

    fn abort(&mut self, error: ParseError<P::Input>) -> ParseError<P::Input> {
        debug!(code = %error.code(), %error, "driver aborted");
        self.aborted = true;
        self.session = None;
        error
    }
}

/// Lazy iterator over the outputs a call to the driver makes available.
///
/// Each `next` runs the engine until one session completes, the engine
/// starves for input, or an error ends the driver. Yields at most one error.
pub struct Outputs<'a, P: Parser, H = NoopObserver> {
    driver: &'a mut Driver<P, H>,
}

impl<P, H> Iterator for Outputs<'_, P, H>
where
    P: Parser,
    P::Input: Clone + fmt::Debug,
    H: Observer<P::Input, P::Output>,
{
    type Item = Result<P::Output, ParseError<P::Input>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.driver.next_output()
    }
}

impl<P, H> std::iter::FusedIterator for Outputs<'_, P, H>
where
    P: Parser,
    P::Input: Clone + fmt::Debug,
    H: Observer<P::Input, P::Output>,
{
}

/// Parse a complete input, collecting every output.
///
/// Stops at the first error.
pub fn parse_all<P, T>(parser: P, items: T) -> Result<Vec<P::Output>, ParseError<P::Input>>
where
    P: Parser,
    P::Input: Clone + fmt::Debug,
    T: IntoIterator<Item = P::Input>,
{
    let mut driver = Driver::new(parser);
    let mut outputs = Vec::new();
    for output in driver.drive(items, false)? {
        outputs.push(output?);
    }
    Ok(outputs)
}

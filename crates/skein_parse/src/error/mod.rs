//! Failure taxonomy.
//!
//! Two layers:
//! - [`Failure`] travels inside computations. It is recoverable or fatal;
//!   `choice`, `repeat` and `catch` may absorb recoverable ones, fatal ones
//!   always escape to the driver.
//! - [`ParseError`] is what the driver hands back to its caller: an escaped
//!   failure stamped with the cursor offset, a [`UsageError`], or a
//!   resource limit.

mod code;

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

use std::fmt;

pub use code::ErrorCode;

use crate::protocol::SessionId;

/// Whether enclosing combinators may recover from a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// `choice`, `repeat` and `catch` may absorb it.
    Recoverable,
    /// Escapes every enclosing combinator.
    Fatal,
}

/// What went wrong, independent of severity.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FailureKind<I> {
    /// A leaf expectation was not met.
    #[error("unexpected {found:?}, expected {expected}")]
    Unexpected {
        /// The item under the cursor.
        found: I,
        /// Description of what the leaf wanted.
        expected: String,
    },

    /// An item was required but input ended.
    #[error("unexpected end of input, expected {expected}")]
    EndOfInput {
        /// Description of what the leaf wanted.
        expected: String,
    },

    /// Every alternative of a `choice` failed, several equally deep.
    #[error("no alternative matched: {}", describe_group(.0))]
    Aggregate(Vec<Failure<I>>),

    /// Free-form failure raised by user code.
    #[error("{0}")]
    Message(String),

    /// A computation received a response it never asked for.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// A failure raised inside a computation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}{kind}{}", severity_prefix(.severity), context_suffix(.context))]
pub struct Failure<I> {
    kind: FailureKind<I>,
    severity: Severity,
    context: Option<String>,
}

impl<I> Failure<I> {
    /// Create a recoverable failure of the given kind.
    pub fn new(kind: FailureKind<I>) -> Self {
        Self {
            kind,
            severity: Severity::Recoverable,
            context: None,
        }
    }

    /// A leaf saw `found` where it wanted `expected`.
    #[cold]
    pub fn unexpected(found: I, expected: impl Into<String>) -> Self {
        Self::new(FailureKind::Unexpected {
            found,
            expected: expected.into(),
        })
    }

    /// A leaf needed an item but input ended.
    #[cold]
    pub fn end_of_input(expected: impl Into<String>) -> Self {
        Self::new(FailureKind::EndOfInput {
            expected: expected.into(),
        })
    }

    /// Bundle of alternatives that failed equally deep.
    #[cold]
    pub fn aggregate(failures: Vec<Self>) -> Self {
        Self::new(FailureKind::Aggregate(failures))
    }

    /// Failure with a free-form message.
    #[cold]
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Message(message.into()))
    }

    /// Always fatal: a broken protocol cannot be recovered by backtracking.
    #[cold]
    pub(crate) fn protocol_violation(detail: &str) -> Self {
        Self::new(FailureKind::Protocol(detail.to_string())).into_fatal()
    }

    pub fn kind(&self) -> &FailureKind<I> {
        &self.kind
    }

    pub fn into_kind(self) -> FailureKind<I> {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// The "while parsing ..." label, if one was attached.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Promote to fatal. The kind is kept for diagnostics.
    #[must_use]
    pub fn into_fatal(mut self) -> Self {
        self.severity = Severity::Fatal;
        self
    }

    /// Attach a context label unless an inner combinator already did.
    ///
    /// The innermost label wins, so the message names the most specific
    /// construct being parsed.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if self.context.is_none() {
            self.context = Some(context.into());
        }
        self
    }

    /// Members of an aggregate; a single-element slice otherwise.
    pub fn alternatives(&self) -> &[Self] {
        match &self.kind {
            FailureKind::Aggregate(failures) => failures,
            _ => std::slice::from_ref(self),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            FailureKind::Unexpected { .. } => ErrorCode::E1001,
            FailureKind::EndOfInput { .. } => ErrorCode::E1002,
            FailureKind::Aggregate(_) => ErrorCode::E1003,
            FailureKind::Message(_) => ErrorCode::E1004,
            FailureKind::Protocol(_) => ErrorCode::E1005,
        }
    }
}

fn severity_prefix(severity: &Severity) -> &'static str {
    match severity {
        Severity::Recoverable => "",
        Severity::Fatal => "fatal: ",
    }
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(context) => format!(" ({context})"),
        None => String::new(),
    }
}

fn describe_group<I: fmt::Debug>(failures: &[Failure<I>]) -> String {
    if failures.is_empty() {
        return "no alternatives".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Misuse of the engine by a computation or by the caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// The computation completed without a single request.
    #[error("computation completed without requesting any input")]
    NoConsumption,

    /// The computation completed without consuming while input remains,
    /// so every later session would do the same.
    #[error("computation completed at offset {offset} without consuming buffered input")]
    NoProgress {
        /// Cursor at completion.
        offset: usize,
    },

    /// A snapshot token was replayed into a session that did not mint it.
    #[error("snapshot from session {token} replayed into session {current}")]
    ForeignSnapshot {
        /// Session recorded in the token.
        token: SessionId,
        /// Session that received it.
        current: SessionId,
    },

    /// A snapshot token points outside the retained input.
    #[error("snapshot offset {offset} lies outside the retained input {start}..={end}")]
    StaleSnapshot {
        /// Offset recorded in the token.
        offset: usize,
        /// First offset still retained by the session.
        start: usize,
        /// One past the last buffered item.
        end: usize,
    },

    /// Input was fed after end of input was declared.
    #[error("input already finished")]
    InputFinished,

    /// The driver was used after a failure aborted it.
    #[error("driver was aborted by an earlier failure")]
    Aborted,
}

impl UsageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UsageError::NoConsumption => ErrorCode::E2001,
            UsageError::NoProgress { .. } => ErrorCode::E2002,
            UsageError::ForeignSnapshot { .. } => ErrorCode::E2003,
            UsageError::StaleSnapshot { .. } => ErrorCode::E2004,
            UsageError::InputFinished => ErrorCode::E2005,
            UsageError::Aborted => ErrorCode::E2006,
        }
    }
}

/// Error returned by the driver.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError<I> {
    /// A failure escaped the top-level computation.
    #[error("{failure} at offset {offset}")]
    Failure {
        failure: Failure<I>,
        /// Cursor when the failure escaped; after a failed `choice` this is
        /// the deepest point any alternative reached.
        offset: usize,
    },

    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Streaming input piled up past the configured limit.
    #[error("retained buffer holds {retained} items, limit is {limit}")]
    BufferOverflow { retained: usize, limit: usize },
}

impl<I> ParseError<I> {
    pub(crate) fn failure(failure: Failure<I>, offset: usize) -> Self {
        ParseError::Failure { failure, offset }
    }

    /// The escaped failure, if this is one.
    pub fn as_failure(&self) -> Option<&Failure<I>> {
        match self {
            ParseError::Failure { failure, .. } => Some(failure),
            ParseError::Usage(_) | ParseError::BufferOverflow { .. } => None,
        }
    }

    /// The usage error, if this is one.
    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            ParseError::Usage(usage) => Some(usage),
            ParseError::Failure { .. } | ParseError::BufferOverflow { .. } => None,
        }
    }

    /// Offset at which a failure escaped.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Failure { offset, .. } => Some(*offset),
            ParseError::Usage(_) | ParseError::BufferOverflow { .. } => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::Failure { failure, .. } => failure.code(),
            ParseError::Usage(usage) => usage.code(),
            ParseError::BufferOverflow { .. } => ErrorCode::E3001,
        }
    }
}

//! Request/response protocol between computations and the driver.
//!
//! A computation never sees the input directly. It suspends with a
//! [`Request`], and the driver resumes it with the matching [`Response`]:
//!
//! | Request | Response |
//! |---------|----------|
//! | `Peek` | `Item` at the cursor, or `EndOfInput` |
//! | `Consume` | `Item` at the cursor (cursor advances), or `EndOfInput` |
//! | `Snapshot` | `Snapshot` token for the current cursor |
//! | `Rollback(token)` | the same `Snapshot` token, cursor reset to it |
//!
//! Combinators forward requests from the computations they wrap unchanged
//! and hand responses back down untouched; only leaves, `choice` and
//! `repeat` issue requests of their own.

use std::fmt;

use crate::error::Failure;

/// Identity of one driver session (one run of the top-level computation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl SessionId {
    /// The raw session number, counting from zero per driver.
    #[inline]
    pub fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A captured cursor position, minted by the driver.
///
/// A token is only meaningful inside the session that produced it. Replaying
/// it anywhere else fails with a usage error instead of moving the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotToken {
    session: SessionId,
    offset: usize,
}

impl SnapshotToken {
    #[inline]
    pub(crate) fn new(session: SessionId, offset: usize) -> Self {
        Self { session, offset }
    }

    /// The session this token belongs to.
    #[inline]
    pub fn session(self) -> SessionId {
        self.session
    }

    /// Absolute offset into the input stream at capture time.
    #[inline]
    pub fn offset(self) -> usize {
        self.offset
    }
}

/// What a suspended computation asks the driver for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// Look at the item under the cursor without moving.
    Peek,
    /// Take the item under the cursor and advance by one.
    Consume,
    /// Capture the cursor.
    Snapshot,
    /// Reset the cursor to a previously captured token.
    Rollback(SnapshotToken),
}

/// The driver's answer to a [`Request`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response<I> {
    /// The item under the cursor.
    Item(I),
    /// Input is exhausted and no more will arrive.
    EndOfInput,
    /// Answer to `Snapshot` and `Rollback`.
    Snapshot(SnapshotToken),
}

impl<I> Response<I> {
    /// The item, if this response carries one.
    pub fn into_item(self) -> Option<I> {
        match self {
            Response::Item(item) => Some(item),
            Response::EndOfInput | Response::Snapshot(_) => None,
        }
    }

    /// The snapshot token, if this response carries one.
    pub fn into_token(self) -> Option<SnapshotToken> {
        match self {
            Response::Snapshot(token) => Some(token),
            Response::Item(_) | Response::EndOfInput => None,
        }
    }
}

/// Result of stepping a computation once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step<O> {
    /// Waiting for the driver to answer this request.
    Suspend(Request),
    /// Finished with an output.
    Complete(O),
}

/// One resume: a step forward, or a failure escaping the computation.
pub type Resumed<I, O> = Result<Step<O>, Failure<I>>;

/// A resumable computation: a state machine stepped by the driver.
///
/// The first call to [`resume`](Computation::resume) passes `None` and runs
/// the computation to its first suspension point. Every later call passes
/// the driver's answer to the request returned by the previous call.
pub trait Computation {
    /// Input item type the computation observes.
    type Input;
    /// Value produced on completion.
    type Output;

    /// Advance to the next suspension point or to completion.
    fn resume(
        &mut self,
        response: Option<Response<Self::Input>>,
    ) -> Resumed<Self::Input, Self::Output>;
}

impl<C: Computation + ?Sized> Computation for Box<C> {
    type Input = C::Input;
    type Output = C::Output;

    #[inline]
    fn resume(
        &mut self,
        response: Option<Response<Self::Input>>,
    ) -> Resumed<Self::Input, Self::Output> {
        (**self).resume(response)
    }
}

/// Extract the token from an answer to `Snapshot` or `Rollback`.
pub(crate) fn expect_token<I>(
    response: Option<Response<I>>,
) -> Result<SnapshotToken, Failure<I>> {
    response
        .and_then(Response::into_token)
        .ok_or_else(|| Failure::protocol_violation("expected a snapshot token"))
}

//! One run of the top-level computation.
//!
//! A session owns the running computation and its cursor. It answers the
//! computation's requests against the shared buffer; the driver decides
//! when sessions start, when they starve and what happens on completion.

use tracing::trace;

use super::buffer::Buffer;
use crate::error::UsageError;
use crate::hooks::Observer;
use crate::protocol::{Computation, Request, Response, SessionId, SnapshotToken};

/// What the next `resume` call should carry.
pub(crate) enum Resume<I> {
    /// First resume of a fresh computation.
    Start,
    /// The answer to the pending request.
    With(Response<I>),
    /// The pending request needs input that has not arrived yet.
    Starved,
}

pub(crate) struct Session<C> {
    id: SessionId,
    computation: C,
    /// Offset at which the session started. Nothing before it is reachable.
    start: usize,
    cursor: usize,
    /// Request surfaced by the last resume; `None` before the first one.
    pending: Option<Request>,
}

impl<C: Computation> Session<C>
where
    C::Input: Clone,
{
    pub(crate) fn new(id: SessionId, computation: C, start: usize) -> Self {
        Self {
            id,
            computation,
            start,
            cursor: start,
            pending: None,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    pub(crate) fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the computation has not yet been resumed.
    #[inline]
    pub(crate) fn is_fresh(&self) -> bool {
        self.pending.is_none()
    }

    pub(crate) fn computation_mut(&mut self) -> &mut C {
        &mut self.computation
    }

    /// Record the request the computation suspended on.
    pub(crate) fn suspend(&mut self, request: Request) {
        trace!(session = %self.id, cursor = self.cursor, ?request, "suspended");
        self.pending = Some(request);
    }

    /// Resolve the pending request against the buffer.
    ///
    /// Starving leaves the request pending, so calling again after more
    /// input arrives picks up where this call stopped.
    pub(crate) fn answer<H>(
        &mut self,
        buffer: &Buffer<C::Input>,
        observer: &mut H,
        finished: bool,
    ) -> Result<Resume<C::Input>, UsageError>
    where
        H: Observer<C::Input, C::Output>,
    {
        let Some(request) = self.pending else {
            return Ok(Resume::Start);
        };
        let response = match request {
            Request::Snapshot => Response::Snapshot(SnapshotToken::new(self.id, self.cursor)),
            Request::Rollback(token) => {
                self.restore(token, buffer, observer)?;
                Response::Snapshot(token)
            }
            Request::Peek | Request::Consume => match buffer.get(self.cursor) {
                Some(item) => {
                    if request == Request::Consume {
                        observer.on_consume(item);
                        self.cursor += 1;
                    }
                    Response::Item(item.clone())
                }
                None if finished => Response::EndOfInput,
                None => {
                    trace!(session = %self.id, cursor = self.cursor, "starved");
                    return Ok(Resume::Starved);
                }
            },
        };
        Ok(Resume::With(response))
    }

    /// Move the cursor to a token minted by this session.
    fn restore<H>(
        &mut self,
        token: SnapshotToken,
        buffer: &Buffer<C::Input>,
        observer: &mut H,
    ) -> Result<(), UsageError>
    where
        H: Observer<C::Input, C::Output>,
    {
        if token.session() != self.id {
            return Err(UsageError::ForeignSnapshot {
                token: token.session(),
                current: self.id,
            });
        }
        let offset = token.offset();
        if offset < self.start || offset > buffer.end() {
            return Err(UsageError::StaleSnapshot {
                offset,
                start: self.start,
                end: buffer.end(),
            });
        }

        if offset < self.cursor {
            observer.on_rollback(buffer.slice(offset, self.cursor));
        } else {
            for item in buffer.slice(self.cursor, offset) {
                observer.on_consume(item);
            }
        }
        trace!(session = %self.id, from = self.cursor, to = offset, "restored");
        self.cursor = offset;
        Ok(())
    }
}

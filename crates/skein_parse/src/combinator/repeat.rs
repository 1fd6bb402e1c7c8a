//! Bounded repetition.
//!
//! The first `min` runs are mandatory and their failures propagate. Each
//! later run is optional: it is preceded by a checkpoint snapshot, and a
//! recoverable failure rolls back to that checkpoint and ends the
//! repetition with the outputs collected so far.
//!
//! An unbounded repetition whose optional run succeeds without consuming
//! would repeat forever, so it stops once a checkpoint lands where the
//! previous one did. Bounded repetitions always attempt up to `max` runs.

use std::mem;
use std::rc::Rc;

use crate::error::Failure;
use crate::parser::Parser;
use crate::protocol::{expect_token, Computation, Request, Response, Resumed, SnapshotToken, Step};

/// Runs a parser between `min` and `max` times.
pub struct Repeat<P> {
    parser: Rc<P>,
    min: usize,
    max: Option<usize>,
}

impl<P> Repeat<P> {
    /// `max` below `min` is raised to `min`.
    pub(crate) fn new(parser: P, min: usize, max: Option<usize>) -> Self {
        Self {
            parser: Rc::new(parser),
            min,
            max: max.map(|max| max.max(min)),
        }
    }
}

impl<P> Clone for Repeat<P> {
    fn clone(&self) -> Self {
        Self {
            parser: Rc::clone(&self.parser),
            min: self.min,
            max: self.max,
        }
    }
}

impl<P: Parser> Parser for Repeat<P> {
    type Input = P::Input;
    type Output = Vec<P::Output>;
    type Computation = RepeatComputation<P>;

    fn computation(&self) -> Self::Computation {
        RepeatComputation {
            parser: Rc::clone(&self.parser),
            min: self.min,
            max: self.max,
            outputs: Vec::new(),
            last_checkpoint: None,
            state: RepeatState::Next,
        }
    }
}

enum RepeatState<C> {
    /// Decide whether another run starts.
    Next,
    Mandatory(C),
    AwaitCheckpoint,
    Optional { checkpoint: SnapshotToken, computation: C },
    /// Rolling back a failed optional run.
    AwaitRollback,
    Done,
}

pub struct RepeatComputation<P: Parser> {
    parser: Rc<P>,
    min: usize,
    max: Option<usize>,
    outputs: Vec<P::Output>,
    /// Offset of the previous optional checkpoint.
    last_checkpoint: Option<usize>,
    state: RepeatState<P::Computation>,
}

impl<P: Parser> RepeatComputation<P> {
    fn finish(&mut self) -> Resumed<P::Input, Vec<P::Output>> {
        tracing::trace!(runs = self.outputs.len(), "repetition done");
        Ok(Step::Complete(mem::take(&mut self.outputs)))
    }
}

impl<P: Parser> Computation for RepeatComputation<P> {
    type Input = P::Input;
    type Output = Vec<P::Output>;

    fn resume(
        &mut self,
        mut response: Option<Response<P::Input>>,
    ) -> Resumed<P::Input, Vec<P::Output>> {
        loop {
            match mem::replace(&mut self.state, RepeatState::Done) {
                RepeatState::Next => {
                    let runs = self.outputs.len();
                    if self.max.is_some_and(|max| runs >= max) {
                        return self.finish();
                    }
                    if runs < self.min {
                        self.state = RepeatState::Mandatory(self.parser.computation());
                    } else {
                        self.state = RepeatState::AwaitCheckpoint;
                        return Ok(Step::Suspend(Request::Snapshot));
                    }
                }
                RepeatState::Mandatory(mut computation) => {
                    match computation.resume(response.take())? {
                        Step::Suspend(request) => {
                            self.state = RepeatState::Mandatory(computation);
                            return Ok(Step::Suspend(request));
                        }
                        Step::Complete(output) => {
                            self.outputs.push(output);
                            self.state = RepeatState::Next;
                        }
                    }
                }
                RepeatState::AwaitCheckpoint => {
                    let checkpoint = expect_token(response.take())?;
                    if self.max.is_none() && self.last_checkpoint == Some(checkpoint.offset()) {
                        return self.finish();
                    }
                    self.last_checkpoint = Some(checkpoint.offset());
                    self.state = RepeatState::Optional {
                        checkpoint,
                        computation: self.parser.computation(),
                    };
                }
                RepeatState::Optional {
                    checkpoint,
                    mut computation,
                } => match computation.resume(response.take()) {
                    Ok(Step::Suspend(request)) => {
                        self.state = RepeatState::Optional {
                            checkpoint,
                            computation,
                        };
                        return Ok(Step::Suspend(request));
                    }
                    Ok(Step::Complete(output)) => {
                        self.outputs.push(output);
                        self.state = RepeatState::Next;
                    }
                    Err(failure) if failure.is_fatal() => return Err(failure),
                    Err(_) => {
                        self.state = RepeatState::AwaitRollback;
                        return Ok(Step::Suspend(Request::Rollback(checkpoint)));
                    }
                },
                RepeatState::AwaitRollback => {
                    expect_token(response.take())?;
                    return self.finish();
                }
                RepeatState::Done => {
                    return Err(Failure::protocol_violation("resumed after completion"));
                }
            }
        }
    }
}

/// Run `parser` at least `min` and at most `max` times; `None` is unbounded.
pub fn repeat<P: Parser>(parser: P, min: usize, max: Option<usize>) -> Repeat<P> {
    Repeat::new(parser, min, max)
}

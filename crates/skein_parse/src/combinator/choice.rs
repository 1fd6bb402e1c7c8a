//! Ordered choice with furthest-failure reporting.
//!
//! `choice` snapshots the cursor, then tries each alternative in turn. After
//! a recoverable failure it snapshots again to learn how far the failed
//! alternative got, rolls back to the start and tries the next one. When all
//! of them fail, the cursor is left at the deepest point any alternative
//! reached and the failures from that point are reported: the single one
//! verbatim, or an aggregate when several alternatives got equally far.
//!
//! A fatal failure ends the choice at once, without rolling back.

use std::mem;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::trace;

use crate::error::Failure;
use crate::parser::{BoxedParser, Parser};
use crate::protocol::{expect_token, Computation, Request, Response, Resumed, SnapshotToken, Step};

/// Tries alternatives in order; the first success wins.
pub struct Choice<I, O> {
    alternatives: Rc<[BoxedParser<I, O>]>,
}

impl<I, O> Clone for Choice<I, O> {
    fn clone(&self) -> Self {
        Self {
            alternatives: Rc::clone(&self.alternatives),
        }
    }
}

impl<I, O> Parser for Choice<I, O> {
    type Input = I;
    type Output = O;
    type Computation = ChoiceComputation<I, O>;

    fn computation(&self) -> Self::Computation {
        ChoiceComputation {
            alternatives: Rc::clone(&self.alternatives),
            state: ChoiceState::Start,
            furthest: None,
        }
    }
}

type Alternative<I, O> = Box<dyn Computation<Input = I, Output = O>>;

enum ChoiceState<I, O> {
    Start,
    /// Waiting for the snapshot taken before the first alternative.
    AwaitInitial,
    /// Cursor is at `initial`; start alternative `next`.
    Next { initial: SnapshotToken, next: usize },
    Running {
        initial: SnapshotToken,
        index: usize,
        computation: Alternative<I, O>,
    },
    /// Waiting for the snapshot that measures how far `failure` got.
    AwaitFailureSnapshot {
        initial: SnapshotToken,
        index: usize,
        failure: Failure<I>,
    },
    /// Waiting for the rollback before alternative `next`.
    AwaitRollback { initial: SnapshotToken, next: usize },
    /// Waiting for the rollback to the furthest failure.
    AwaitFinalRollback,
    Done,
}

/// Failures that reached the same, deepest offset.
struct FailureGroup<I> {
    token: SnapshotToken,
    failures: SmallVec<[Failure<I>; 2]>,
}

pub struct ChoiceComputation<I, O> {
    alternatives: Rc<[BoxedParser<I, O>]>,
    state: ChoiceState<I, O>,
    furthest: Option<FailureGroup<I>>,
}

impl<I, O> ChoiceComputation<I, O> {
    /// Keep `failure` if it got at least as far as the current group.
    fn record(&mut self, token: SnapshotToken, failure: Failure<I>) {
        match &mut self.furthest {
            Some(group) if token.offset() == group.token.offset() => {
                group.failures.push(failure);
            }
            Some(group) if token.offset() < group.token.offset() => {}
            _ => {
                let mut failures = SmallVec::new();
                failures.push(failure);
                self.furthest = Some(FailureGroup { token, failures });
            }
        }
    }

    fn into_failure(group: FailureGroup<I>) -> Failure<I> {
        let mut failures = group.failures.into_vec();
        if failures.len() == 1 {
            if let Some(failure) = failures.pop() {
                return failure;
            }
        }
        Failure::aggregate(failures)
    }
}

impl<I, O> Computation for ChoiceComputation<I, O> {
    type Input = I;
    type Output = O;

    fn resume(&mut self, mut response: Option<Response<I>>) -> Resumed<I, O> {
        loop {
            match mem::replace(&mut self.state, ChoiceState::Done) {
                ChoiceState::Start => {
                    if self.alternatives.is_empty() {
                        return Err(Failure::aggregate(Vec::new()));
                    }
                    self.state = ChoiceState::AwaitInitial;
                    return Ok(Step::Suspend(Request::Snapshot));
                }
                ChoiceState::AwaitInitial => {
                    let initial = expect_token(response.take())?;
                    self.state = ChoiceState::Next { initial, next: 0 };
                }
                ChoiceState::AwaitRollback { initial, next } => {
                    expect_token(response.take())?;
                    self.state = ChoiceState::Next { initial, next };
                }
                ChoiceState::Next { initial, next } => {
                    let Some(alternative) = self.alternatives.get(next) else {
                        return Err(Failure::protocol_violation("alternative out of range"));
                    };
                    trace!(alternative = next, offset = initial.offset(), "trying alternative");
                    self.state = ChoiceState::Running {
                        initial,
                        index: next,
                        computation: alternative.computation(),
                    };
                }
                ChoiceState::Running {
                    initial,
                    index,
                    mut computation,
                } => match computation.resume(response.take()) {
                    Ok(Step::Suspend(request)) => {
                        self.state = ChoiceState::Running {
                            initial,
                            index,
                            computation,
                        };
                        return Ok(Step::Suspend(request));
                    }
                    Ok(Step::Complete(output)) => return Ok(Step::Complete(output)),
                    Err(failure) if failure.is_fatal() => return Err(failure),
                    Err(failure) => {
                        self.state = ChoiceState::AwaitFailureSnapshot {
                            initial,
                            index,
                            failure,
                        };
                        return Ok(Step::Suspend(Request::Snapshot));
                    }
                },
                ChoiceState::AwaitFailureSnapshot {
                    initial,
                    index,
                    failure,
                } => {
                    let reached = expect_token(response.take())?;
                    trace!(alternative = index, reached = reached.offset(), "alternative failed");
                    self.record(reached, failure);

                    let next = index + 1;
                    if next < self.alternatives.len() {
                        self.state = ChoiceState::AwaitRollback { initial, next };
                        return Ok(Step::Suspend(Request::Rollback(initial)));
                    }
                    let Some(group) = &self.furthest else {
                        return Err(Failure::protocol_violation("no failure recorded"));
                    };
                    let furthest = group.token;
                    self.state = ChoiceState::AwaitFinalRollback;
                    return Ok(Step::Suspend(Request::Rollback(furthest)));
                }
                ChoiceState::AwaitFinalRollback => {
                    expect_token(response.take())?;
                    return Err(match self.furthest.take() {
                        Some(group) => Self::into_failure(group),
                        None => Failure::protocol_violation("no failure recorded"),
                    });
                }
                ChoiceState::Done => {
                    return Err(Failure::protocol_violation("resumed after completion"));
                }
            }
        }
    }
}

/// Try `alternatives` in order and return the first success.
///
/// An empty list fails with an empty aggregate.
pub fn choice<I, O>(alternatives: impl IntoIterator<Item = BoxedParser<I, O>>) -> Choice<I, O> {
    Choice {
        alternatives: alternatives.into_iter().collect(),
    }
}

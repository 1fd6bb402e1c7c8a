//! Sequencing: run parsers one after another and collect their outputs.
//!
//! Failures propagate unmodified and nothing is rolled back; the enclosing
//! `choice` or `repeat` owns backtracking.

use std::rc::Rc;

use crate::error::Failure;
use crate::parser::{BoxedParser, Parser};
use crate::protocol::{Computation, Response, Resumed, Step};

use super::bind::Map;
use super::recover::{fatal, Fatal};

/// Runs two parsers in order, returning both outputs.
pub struct Pair<P, Q> {
    first: P,
    second: Rc<Q>,
}

impl<P, Q> Pair<P, Q> {
    pub(crate) fn new(first: P, second: Q) -> Self {
        Self {
            first,
            second: Rc::new(second),
        }
    }
}

impl<P: Clone, Q> Clone for Pair<P, Q> {
    fn clone(&self) -> Self {
        Self {
            first: self.first.clone(),
            second: Rc::clone(&self.second),
        }
    }
}

impl<P, Q> Parser for Pair<P, Q>
where
    P: Parser,
    Q: Parser<Input = P::Input>,
{
    type Input = P::Input;
    type Output = (P::Output, Q::Output);
    type Computation = PairComputation<P::Computation, Q>;

    fn computation(&self) -> Self::Computation {
        PairComputation {
            second: Rc::clone(&self.second),
            state: PairState::First(self.first.computation()),
        }
    }
}

enum PairState<CA, OA, CB> {
    First(CA),
    /// The first output is taken on completion.
    Second(Option<OA>, CB),
}

pub struct PairComputation<C: Computation, Q: Parser> {
    second: Rc<Q>,
    state: PairState<C, C::Output, Q::Computation>,
}

impl<C, Q> Computation for PairComputation<C, Q>
where
    C: Computation,
    Q: Parser<Input = C::Input>,
{
    type Input = C::Input;
    type Output = (C::Output, Q::Output);

    fn resume(
        &mut self,
        mut response: Option<Response<C::Input>>,
    ) -> Resumed<C::Input, Self::Output> {
        loop {
            match &mut self.state {
                PairState::First(first) => match first.resume(response.take())? {
                    Step::Suspend(request) => return Ok(Step::Suspend(request)),
                    Step::Complete(a) => {
                        self.state = PairState::Second(Some(a), self.second.computation());
                    }
                },
                PairState::Second(a, second) => {
                    return match second.resume(response.take())? {
                        Step::Suspend(request) => Ok(Step::Suspend(request)),
                        Step::Complete(b) => match a.take() {
                            Some(a) => Ok(Step::Complete((a, b))),
                            None => Err(Failure::protocol_violation("resumed after completion")),
                        },
                    };
                }
            }
        }
    }
}

/// Tuples of parsers over one input type, run left to right.
pub trait Sequence {
    /// The composed parser.
    type Parser: Parser;

    fn into_parser(self) -> Self::Parser;
}

impl<A, B> Sequence for (A, B)
where
    A: Parser,
    B: Parser<Input = A::Input>,
{
    type Parser = Pair<A, B>;

    fn into_parser(self) -> Self::Parser {
        Pair::new(self.0, self.1)
    }
}

type Flatten<In, Out> = fn(In) -> Out;

fn flatten3<A, B, C>(((a, b), c): ((A, B), C)) -> (A, B, C) {
    (a, b, c)
}

fn flatten4<A, B, C, D>((((a, b), c), d): (((A, B), C), D)) -> (A, B, C, D) {
    (a, b, c, d)
}

impl<A, B, C> Sequence for (A, B, C)
where
    A: Parser,
    B: Parser<Input = A::Input>,
    C: Parser<Input = A::Input>,
{
    #[allow(clippy::type_complexity, reason = "nameable composed type")]
    type Parser = Map<
        Pair<Pair<A, B>, C>,
        Flatten<((A::Output, B::Output), C::Output), (A::Output, B::Output, C::Output)>,
    >;

    fn into_parser(self) -> Self::Parser {
        let (a, b, c) = self;
        Map::new(Pair::new(Pair::new(a, b), c), flatten3 as Flatten<_, _>)
    }
}

impl<A, B, C, D> Sequence for (A, B, C, D)
where
    A: Parser,
    B: Parser<Input = A::Input>,
    C: Parser<Input = A::Input>,
    D: Parser<Input = A::Input>,
{
    #[allow(clippy::type_complexity, reason = "nameable composed type")]
    type Parser = Map<
        Pair<Pair<Pair<A, B>, C>, D>,
        Flatten<
            (((A::Output, B::Output), C::Output), D::Output),
            (A::Output, B::Output, C::Output, D::Output),
        >,
    >;

    fn into_parser(self) -> Self::Parser {
        let (a, b, c, d) = self;
        Map::new(
            Pair::new(Pair::new(Pair::new(a, b), c), d),
            flatten4 as Flatten<_, _>,
        )
    }
}

/// Run a tuple of parsers in order, returning the tuple of their outputs.
pub fn sequence<S: Sequence>(parsers: S) -> S::Parser {
    parsers.into_parser()
}

/// `start`, then `body` and `end`, both fatal once `start` matched.
#[allow(clippy::type_complexity, reason = "nameable composed type")]
pub fn between<S, B, E>(start: S, body: B, end: E) -> <(S, Fatal<B>, Fatal<E>) as Sequence>::Parser
where
    S: Parser,
    B: Parser<Input = S::Input>,
    E: Parser<Input = S::Input>,
{
    sequence((start, fatal(body), fatal(end)))
}

/// Runs a list of parsers in order, collecting their outputs.
pub struct All<I, O> {
    parsers: Rc<[BoxedParser<I, O>]>,
}

impl<I, O> Clone for All<I, O> {
    fn clone(&self) -> Self {
        Self {
            parsers: Rc::clone(&self.parsers),
        }
    }
}

impl<I, O> Parser for All<I, O> {
    type Input = I;
    type Output = Vec<O>;
    type Computation = AllComputation<I, O>;

    fn computation(&self) -> Self::Computation {
        AllComputation {
            parsers: Rc::clone(&self.parsers),
            current: None,
            outputs: Vec::with_capacity(self.parsers.len()),
        }
    }
}

pub struct AllComputation<I, O> {
    parsers: Rc<[BoxedParser<I, O>]>,
    current: Option<Box<dyn Computation<Input = I, Output = O>>>,
    outputs: Vec<O>,
}

impl<I, O> Computation for AllComputation<I, O> {
    type Input = I;
    type Output = Vec<O>;

    fn resume(&mut self, mut response: Option<Response<I>>) -> Resumed<I, Vec<O>> {
        loop {
            let current = match self.current.take() {
                Some(current) => current,
                None => match self.parsers.get(self.outputs.len()) {
                    Some(parser) => parser.computation(),
                    None => return Ok(Step::Complete(std::mem::take(&mut self.outputs))),
                },
            };
            let current = self.current.insert(current);
            match current.resume(response.take())? {
                Step::Suspend(request) => return Ok(Step::Suspend(request)),
                Step::Complete(output) => {
                    self.outputs.push(output);
                    self.current = None;
                }
            }
        }
    }
}

/// Run every parser in order, returning their outputs.
pub fn all<I, O>(parsers: impl IntoIterator<Item = BoxedParser<I, O>>) -> All<I, O> {
    All {
        parsers: parsers.into_iter().collect(),
    }
}

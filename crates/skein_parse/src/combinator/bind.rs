//! Output transforms: `map` and monadic `then`.

use std::rc::Rc;

use crate::parser::Parser;
use crate::protocol::{Computation, Response, Resumed, Step};

/// Transforms the output of a parser.
pub struct Map<P, F> {
    parser: P,
    f: Rc<F>,
}

impl<P, F> Map<P, F> {
    pub(crate) fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f: Rc::new(f),
        }
    }
}

impl<P: Clone, F> Clone for Map<P, F> {
    fn clone(&self) -> Self {
        Self {
            parser: self.parser.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<P, F, U> Parser for Map<P, F>
where
    P: Parser,
    F: Fn(P::Output) -> U,
{
    type Input = P::Input;
    type Output = U;
    type Computation = MapComputation<P::Computation, F>;

    fn computation(&self) -> Self::Computation {
        MapComputation {
            inner: self.parser.computation(),
            f: Rc::clone(&self.f),
        }
    }
}

pub struct MapComputation<C, F> {
    inner: C,
    f: Rc<F>,
}

impl<C, F, U> Computation for MapComputation<C, F>
where
    C: Computation,
    F: Fn(C::Output) -> U,
{
    type Input = C::Input;
    type Output = U;

    #[inline]
    fn resume(&mut self, response: Option<Response<C::Input>>) -> Resumed<C::Input, U> {
        Ok(match self.inner.resume(response)? {
            Step::Suspend(request) => Step::Suspend(request),
            Step::Complete(output) => Step::Complete((self.f)(output)),
        })
    }
}

/// Transform the output of `parser`.
pub fn map<P, F, U>(parser: P, f: F) -> Map<P, F>
where
    P: Parser,
    F: Fn(P::Output) -> U,
{
    Map::new(parser, f)
}

/// Runs a parser, then the parser built from its output.
pub struct Then<P, F> {
    parser: P,
    f: Rc<F>,
}

impl<P, F> Then<P, F> {
    pub(crate) fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f: Rc::new(f),
        }
    }
}

impl<P: Clone, F> Clone for Then<P, F> {
    fn clone(&self) -> Self {
        Self {
            parser: self.parser.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<P, F, Q> Parser for Then<P, F>
where
    P: Parser,
    F: Fn(P::Output) -> Q,
    Q: Parser<Input = P::Input>,
{
    type Input = P::Input;
    type Output = Q::Output;
    type Computation = ThenComputation<P::Computation, F, Q>;

    fn computation(&self) -> Self::Computation {
        ThenComputation {
            f: Rc::clone(&self.f),
            state: ThenState::First(self.parser.computation()),
        }
    }
}

enum ThenState<C, D> {
    First(C),
    Second(D),
}

pub struct ThenComputation<C, F, Q: Parser> {
    f: Rc<F>,
    state: ThenState<C, Q::Computation>,
}

impl<C, F, Q> Computation for ThenComputation<C, F, Q>
where
    C: Computation,
    F: Fn(C::Output) -> Q,
    Q: Parser<Input = C::Input>,
{
    type Input = C::Input;
    type Output = Q::Output;

    fn resume(&mut self, response: Option<Response<C::Input>>) -> Resumed<C::Input, Q::Output> {
        let output = match &mut self.state {
            ThenState::Second(next) => return next.resume(response),
            ThenState::First(first) => match first.resume(response)? {
                Step::Suspend(request) => return Ok(Step::Suspend(request)),
                Step::Complete(output) => output,
            },
        };
        let mut next = (self.f)(output).computation();
        let step = next.resume(None);
        self.state = ThenState::Second(next);
        step
    }
}

/// Run `parser`, then the parser `f` builds from its output.
pub fn then<P, F, Q>(parser: P, f: F) -> Then<P, F>
where
    P: Parser,
    F: Fn(P::Output) -> Q,
    Q: Parser<Input = P::Input>,
{
    Then::new(parser, f)
}

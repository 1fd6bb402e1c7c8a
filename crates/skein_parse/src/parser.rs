//! The parser capability: anything that can start a fresh computation.
//!
//! A parser is an immutable description; the driver asks it for a new
//! [`Computation`] at the start of every session. Combinators are plain
//! structs holding their sub-parsers, so composition is static and the
//! driver only ever sees the requests the composed computation issues.

use std::rc::Rc;

use crate::combinator::{choice, Catch, Choice, Fatal, Label, Map, Pair, Recover, Repeat, Then};
use crate::error::Failure;
use crate::protocol::Computation;

/// Produces resumable computations over `Input` items.
pub trait Parser {
    /// Input item type.
    type Input;
    /// Value produced on success.
    type Output;
    /// The computation started for each run.
    type Computation: Computation<Input = Self::Input, Output = Self::Output>;

    /// Start a fresh computation.
    fn computation(&self) -> Self::Computation;

    /// Transform the output.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> U,
    {
        Map::new(self, f)
    }

    /// Monadic bind: feed the output into `f` and run the parser it returns.
    fn then<Q, F>(self, f: F) -> Then<Self, F>
    where
        Self: Sized,
        Q: Parser<Input = Self::Input>,
        F: Fn(Self::Output) -> Q,
    {
        Then::new(self, f)
    }

    /// Run `self` then `next`, returning both outputs.
    fn pair<Q>(self, next: Q) -> Pair<Self, Q>
    where
        Self: Sized,
        Q: Parser<Input = Self::Input>,
    {
        Pair::new(self, next)
    }

    /// Two-way [`choice`].
    fn or<Q>(self, other: Q) -> Choice<Self::Input, Self::Output>
    where
        Self: Sized + 'static,
        Self::Computation: 'static,
        Q: Parser<Input = Self::Input, Output = Self::Output> + 'static,
        Q::Computation: 'static,
    {
        choice([self.boxed(), other.boxed()])
    }

    /// On a recoverable failure, run the parser `f` builds from it.
    fn catch<Q, F>(self, f: F) -> Catch<Self, F>
    where
        Self: Sized,
        Q: Parser<Input = Self::Input, Output = Self::Output>,
        F: Fn(Failure<Self::Input>) -> Q,
    {
        Catch::new(self, f)
    }

    /// On a recoverable failure, run `fallback` instead.
    fn recover_with<Q>(self, fallback: Q) -> Recover<Self, Q>
    where
        Self: Sized,
        Q: Parser<Input = Self::Input, Output = Self::Output>,
    {
        Recover::new(self, fallback)
    }

    /// Promote every failure to fatal.
    fn fatal(self) -> Fatal<Self>
    where
        Self: Sized,
    {
        Fatal::new(self)
    }

    /// Attach "while parsing `name`" to escaping failures.
    fn label(self, name: impl Into<String>) -> Label<Self>
    where
        Self: Sized,
    {
        Label::new(self, name)
    }

    /// Between `min` and `max` repetitions; `None` is unbounded.
    fn repeat(self, min: usize, max: Option<usize>) -> Repeat<Self>
    where
        Self: Sized,
    {
        Repeat::new(self, min, max)
    }

    /// Zero or more repetitions.
    fn many(self) -> Repeat<Self>
    where
        Self: Sized,
    {
        Repeat::new(self, 0, None)
    }

    /// At least `min` repetitions.
    fn at_least(self, min: usize) -> Repeat<Self>
    where
        Self: Sized,
    {
        Repeat::new(self, min, None)
    }

    /// Zero or one repetition.
    #[allow(clippy::type_complexity, reason = "fn pointer keeps the type nameable")]
    fn optional(self) -> Map<Repeat<Self>, fn(Vec<Self::Output>) -> Option<Self::Output>>
    where
        Self: Sized,
    {
        Repeat::new(self, 0, Some(1)).map(first_of as fn(Vec<Self::Output>) -> Option<Self::Output>)
    }

    /// Erase the concrete type.
    fn boxed(self) -> BoxedParser<Self::Input, Self::Output>
    where
        Self: Sized + 'static,
        Self::Computation: 'static,
    {
        BoxedParser {
            inner: Rc::new(self),
        }
    }
}

fn first_of<T>(items: Vec<T>) -> Option<T> {
    items.into_iter().next()
}

/// Object-safe face of [`Parser`] used behind [`BoxedParser`].
trait ErasedParser<I, O> {
    fn erased_computation(&self) -> Box<dyn Computation<Input = I, Output = O>>;
}

impl<P> ErasedParser<P::Input, P::Output> for P
where
    P: Parser,
    P::Computation: 'static,
{
    fn erased_computation(&self) -> Box<dyn Computation<Input = P::Input, Output = P::Output>> {
        Box::new(self.computation())
    }
}

/// Reference-counted, type-erased parser.
///
/// Cloning is a reference-count bump. Used wherever parsers of different
/// concrete types must share one type: `choice` lists and recursive
/// grammars built with `lazy`.
pub struct BoxedParser<I, O> {
    inner: Rc<dyn ErasedParser<I, O>>,
}

impl<I, O> Clone for BoxedParser<I, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<I, O> Parser for BoxedParser<I, O> {
    type Input = I;
    type Output = O;
    type Computation = Box<dyn Computation<Input = I, Output = O>>;

    fn computation(&self) -> Self::Computation {
        self.inner.erased_computation()
    }
}

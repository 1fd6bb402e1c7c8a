//! Deferred construction and constant parsers.

use std::marker::PhantomData;
use std::rc::Rc;

use skein_stack::{ensure_sufficient_stack, remaining_stack};
use tracing::trace;

use crate::error::Failure;
use crate::parser::Parser;
use crate::protocol::{Computation, Response, Resumed, Step};

/// Builds its parser when a computation starts.
///
/// Recursive grammars refer to themselves through `lazy`, so the parser
/// value stays finite while the computation tree grows with the input.
pub struct Lazy<F> {
    build: Rc<F>,
}

impl<F> Clone for Lazy<F> {
    fn clone(&self) -> Self {
        Self {
            build: Rc::clone(&self.build),
        }
    }
}

impl<F, Q> Parser for Lazy<F>
where
    F: Fn() -> Q,
    Q: Parser,
{
    type Input = Q::Input;
    type Output = Q::Output;
    type Computation = LazyComputation<F, Q>;

    fn computation(&self) -> Self::Computation {
        LazyComputation {
            build: Rc::clone(&self.build),
            inner: None,
        }
    }
}

pub struct LazyComputation<F, Q: Parser> {
    build: Rc<F>,
    inner: Option<Q::Computation>,
}

impl<F, Q> Computation for LazyComputation<F, Q>
where
    F: Fn() -> Q,
    Q: Parser,
{
    type Input = Q::Input;
    type Output = Q::Output;

    fn resume(&mut self, response: Option<Response<Q::Input>>) -> Resumed<Q::Input, Q::Output> {
        let build = &self.build;
        let inner = self.inner.get_or_insert_with(|| {
            trace!(remaining_stack = ?remaining_stack(), "building deferred parser");
            build().computation()
        });
        ensure_sufficient_stack(|| inner.resume(response))
    }
}

/// Defer building a parser until it runs. Needed for recursive grammars.
pub fn lazy<F, Q>(build: F) -> Lazy<F>
where
    F: Fn() -> Q,
    Q: Parser,
{
    Lazy {
        build: Rc::new(build),
    }
}

/// Completes immediately with a clone of its value.
pub struct Noop<I, T> {
    value: T,
    _input: PhantomData<fn() -> I>,
}

impl<I, T: Clone> Clone for Noop<I, T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _input: PhantomData,
        }
    }
}

impl<I, T: Clone> Parser for Noop<I, T> {
    type Input = I;
    type Output = T;
    type Computation = NoopComputation<I, T>;

    fn computation(&self) -> Self::Computation {
        NoopComputation {
            value: Some(self.value.clone()),
            _input: PhantomData,
        }
    }
}

pub struct NoopComputation<I, T> {
    value: Option<T>,
    _input: PhantomData<fn() -> I>,
}

impl<I, T> Computation for NoopComputation<I, T> {
    type Input = I;
    type Output = T;

    fn resume(&mut self, _response: Option<Response<I>>) -> Resumed<I, T> {
        self.value
            .take()
            .map(Step::Complete)
            .ok_or_else(|| Failure::protocol_violation("resumed after completion"))
    }
}

/// Succeed with `value` without touching the input.
pub fn noop<I, T: Clone>(value: T) -> Noop<I, T> {
    Noop {
        value,
        _input: PhantomData,
    }
}

//! Failure handling: recovery, promotion to fatal, context labels.
//!
//! None of these move the cursor. A fallback starts wherever the failed
//! parser left it; wrap the failing side in `choice` when a clean restart
//! is needed.

use std::rc::Rc;

use crate::error::Failure;
use crate::parser::Parser;
use crate::protocol::{Computation, Response, Resumed};

/// On a recoverable failure, runs the parser built from it.
pub struct Catch<P, F> {
    parser: P,
    handler: Rc<F>,
}

impl<P, F> Catch<P, F> {
    pub(crate) fn new(parser: P, handler: F) -> Self {
        Self {
            parser,
            handler: Rc::new(handler),
        }
    }
}

impl<P: Clone, F> Clone for Catch<P, F> {
    fn clone(&self) -> Self {
        Self {
            parser: self.parser.clone(),
            handler: Rc::clone(&self.handler),
        }
    }
}

impl<P, F, Q> Parser for Catch<P, F>
where
    P: Parser,
    F: Fn(Failure<P::Input>) -> Q,
    Q: Parser<Input = P::Input, Output = P::Output>,
{
    type Input = P::Input;
    type Output = P::Output;
    type Computation = CatchComputation<P::Computation, F, Q>;

    fn computation(&self) -> Self::Computation {
        CatchComputation {
            handler: Rc::clone(&self.handler),
            state: CatchState::Primary(self.parser.computation()),
        }
    }
}

enum CatchState<C, D> {
    Primary(C),
    Fallback(D),
}

pub struct CatchComputation<C, F, Q: Parser> {
    handler: Rc<F>,
    state: CatchState<C, Q::Computation>,
}

impl<C, F, Q> Computation for CatchComputation<C, F, Q>
where
    C: Computation,
    F: Fn(Failure<C::Input>) -> Q,
    Q: Parser<Input = C::Input, Output = C::Output>,
{
    type Input = C::Input;
    type Output = C::Output;

    fn resume(&mut self, response: Option<Response<C::Input>>) -> Resumed<C::Input, C::Output> {
        let failure = match &mut self.state {
            CatchState::Fallback(fallback) => return fallback.resume(response),
            CatchState::Primary(primary) => match primary.resume(response) {
                Err(failure) if !failure.is_fatal() => failure,
                resumed => return resumed,
            },
        };
        tracing::trace!(code = %failure.code(), "caught");
        let mut fallback = (self.handler)(failure).computation();
        let step = fallback.resume(None);
        self.state = CatchState::Fallback(fallback);
        step
    }
}

/// Run `parser`; on a recoverable failure run `handler(failure)` instead.
///
/// Fatal failures bypass the handler.
pub fn catch<P, F, Q>(parser: P, handler: F) -> Catch<P, F>
where
    P: Parser,
    F: Fn(Failure<P::Input>) -> Q,
    Q: Parser<Input = P::Input, Output = P::Output>,
{
    Catch::new(parser, handler)
}

/// On a recoverable failure, runs a fixed fallback parser.
pub struct Recover<P, Q> {
    parser: P,
    fallback: Rc<Q>,
}

impl<P, Q> Recover<P, Q> {
    pub(crate) fn new(parser: P, fallback: Q) -> Self {
        Self {
            parser,
            fallback: Rc::new(fallback),
        }
    }
}

impl<P: Clone, Q> Clone for Recover<P, Q> {
    fn clone(&self) -> Self {
        Self {
            parser: self.parser.clone(),
            fallback: Rc::clone(&self.fallback),
        }
    }
}

impl<P, Q> Parser for Recover<P, Q>
where
    P: Parser,
    Q: Parser<Input = P::Input, Output = P::Output>,
{
    type Input = P::Input;
    type Output = P::Output;
    type Computation = RecoverComputation<P::Computation, Q>;

    fn computation(&self) -> Self::Computation {
        RecoverComputation {
            fallback: Rc::clone(&self.fallback),
            state: CatchState::Primary(self.parser.computation()),
        }
    }
}

pub struct RecoverComputation<C, Q: Parser> {
    fallback: Rc<Q>,
    state: CatchState<C, Q::Computation>,
}

impl<C, Q> Computation for RecoverComputation<C, Q>
where
    C: Computation,
    Q: Parser<Input = C::Input, Output = C::Output>,
{
    type Input = C::Input;
    type Output = C::Output;

    fn resume(&mut self, response: Option<Response<C::Input>>) -> Resumed<C::Input, C::Output> {
        match &mut self.state {
            CatchState::Fallback(fallback) => fallback.resume(response),
            CatchState::Primary(primary) => match primary.resume(response) {
                Err(failure) if !failure.is_fatal() => {
                    tracing::trace!(code = %failure.code(), "recovering");
                    let mut fallback = self.fallback.computation();
                    let step = fallback.resume(None);
                    self.state = CatchState::Fallback(fallback);
                    step
                }
                resumed => resumed,
            },
        }
    }
}

/// Run `parser`; on a recoverable failure run `fallback` instead.
pub fn recover_with<P, Q>(parser: P, fallback: Q) -> Recover<P, Q>
where
    P: Parser,
    Q: Parser<Input = P::Input, Output = P::Output>,
{
    Recover::new(parser, fallback)
}

/// Promotes every failure of a parser to fatal.
#[derive(Clone)]
pub struct Fatal<P> {
    parser: P,
}

impl<P> Fatal<P> {
    pub(crate) fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<P: Parser> Parser for Fatal<P> {
    type Input = P::Input;
    type Output = P::Output;
    type Computation = FatalComputation<P::Computation>;

    fn computation(&self) -> Self::Computation {
        FatalComputation {
            inner: self.parser.computation(),
        }
    }
}

pub struct FatalComputation<C> {
    inner: C,
}

impl<C: Computation> Computation for FatalComputation<C> {
    type Input = C::Input;
    type Output = C::Output;

    #[inline]
    fn resume(&mut self, response: Option<Response<C::Input>>) -> Resumed<C::Input, C::Output> {
        self.inner.resume(response).map_err(Failure::into_fatal)
    }
}

/// Make every failure of `parser` fatal.
pub fn fatal<P: Parser>(parser: P) -> Fatal<P> {
    Fatal::new(parser)
}

/// Attaches a "while parsing ..." context to escaping failures.
#[derive(Clone)]
pub struct Label<P> {
    parser: P,
    context: Rc<str>,
}

impl<P> Label<P> {
    pub(crate) fn new(parser: P, name: impl Into<String>) -> Self {
        Self {
            parser,
            context: Rc::from(format!("while parsing {}", name.into())),
        }
    }
}

impl<P: Parser> Parser for Label<P> {
    type Input = P::Input;
    type Output = P::Output;
    type Computation = LabelComputation<P::Computation>;

    fn computation(&self) -> Self::Computation {
        LabelComputation {
            inner: self.parser.computation(),
            context: Rc::clone(&self.context),
        }
    }
}

pub struct LabelComputation<C> {
    inner: C,
    context: Rc<str>,
}

impl<C: Computation> Computation for LabelComputation<C> {
    type Input = C::Input;
    type Output = C::Output;

    #[inline]
    fn resume(&mut self, response: Option<Response<C::Input>>) -> Resumed<C::Input, C::Output> {
        self.inner
            .resume(response)
            .map_err(|failure| failure.with_context(&*self.context))
    }
}

/// Label `parser` for failure messages.
pub fn label<P: Parser>(parser: P, name: impl Into<String>) -> Label<P> {
    Label::new(parser, name)
}

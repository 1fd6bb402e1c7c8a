//! Leaf parsers: test the item under the cursor and consume it on a match.
//!
//! A leaf peeks first and consumes only after its predicate accepted the
//! item, so a mismatch leaves the cursor untouched.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use regex::Regex;

use crate::error::Failure;
use crate::parser::Parser;
use crate::protocol::{Computation, Request, Response, Resumed, Step};

/// Items whose text can be matched by [`pattern`].
pub trait AsText {
    /// Run `f` over the item's text.
    fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R;
}

impl AsText for char {
    fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let mut buf = [0; 4];
        f(self.encode_utf8(&mut buf))
    }
}

impl AsText for &str {
    fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(*self)
    }
}

impl AsText for String {
    fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(self.as_str())
    }
}

/// Consumes one item accepted by a predicate.
pub struct Satisfy<I, F> {
    expected: Rc<str>,
    predicate: Rc<F>,
    _input: PhantomData<fn() -> I>,
}

impl<I, F> Clone for Satisfy<I, F> {
    fn clone(&self) -> Self {
        Self {
            expected: Rc::clone(&self.expected),
            predicate: Rc::clone(&self.predicate),
            _input: PhantomData,
        }
    }
}

impl<I, F> Parser for Satisfy<I, F>
where
    F: Fn(&I) -> bool,
{
    type Input = I;
    type Output = I;
    type Computation = SatisfyComputation<I, F>;

    fn computation(&self) -> Self::Computation {
        SatisfyComputation {
            leaf: self.clone(),
            state: LeafState::Start,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LeafState {
    Start,
    Peeked,
    Consumed,
}

pub struct SatisfyComputation<I, F> {
    leaf: Satisfy<I, F>,
    state: LeafState,
}

impl<I, F> Computation for SatisfyComputation<I, F>
where
    F: Fn(&I) -> bool,
{
    type Input = I;
    type Output = I;

    fn resume(&mut self, response: Option<Response<I>>) -> Resumed<I, I> {
        match (self.state, response) {
            (LeafState::Start, _) => {
                self.state = LeafState::Peeked;
                Ok(Step::Suspend(Request::Peek))
            }
            (LeafState::Peeked, Some(Response::Item(item))) => {
                if (self.leaf.predicate)(&item) {
                    self.state = LeafState::Consumed;
                    Ok(Step::Suspend(Request::Consume))
                } else {
                    Err(Failure::unexpected(item, &*self.leaf.expected))
                }
            }
            (LeafState::Peeked | LeafState::Consumed, Some(Response::EndOfInput)) => {
                Err(Failure::end_of_input(&*self.leaf.expected))
            }
            (LeafState::Consumed, Some(Response::Item(item))) => Ok(Step::Complete(item)),
            (LeafState::Peeked | LeafState::Consumed, _) => {
                Err(Failure::protocol_violation("expected an item"))
            }
        }
    }
}

/// Consume one item accepted by `predicate`; `expected` describes it in
/// failures.
pub fn satisfy<I, F>(expected: impl Into<String>, predicate: F) -> Satisfy<I, F>
where
    F: Fn(&I) -> bool,
{
    Satisfy {
        expected: Rc::from(expected.into()),
        predicate: Rc::new(predicate),
        _input: PhantomData,
    }
}

/// Consume one item equal to `expected`.
pub fn literal<I>(expected: I) -> Satisfy<I, impl Fn(&I) -> bool>
where
    I: PartialEq + fmt::Debug,
{
    satisfy(format!("{expected:?}"), move |item: &I| *item == expected)
}

/// Consume one item whose whole text matches the regular expression
/// `source`.
pub fn pattern<I>(source: &str) -> Result<Satisfy<I, impl Fn(&I) -> bool>, regex::Error>
where
    I: AsText,
{
    let anchored = Regex::new(&format!(r"\A(?:{source})\z"))?;
    Ok(satisfy(format!("/{source}/"), move |item: &I| {
        item.with_text(|text| anchored.is_match(text))
    }))
}

/// Consume one item from `candidates`.
pub fn one_of<I>(candidates: impl IntoIterator<Item = I>) -> Satisfy<I, impl Fn(&I) -> bool>
where
    I: PartialEq + fmt::Debug,
{
    let candidates: Vec<I> = candidates.into_iter().collect();
    satisfy(format!("one of {candidates:?}"), move |item: &I| {
        candidates.contains(item)
    })
}

/// Consume any single item.
pub fn any<I>() -> Satisfy<I, impl Fn(&I) -> bool> {
    satisfy("any item", |_: &I| true)
}

/// Succeeds only at end of input, consuming nothing.
pub struct End<I> {
    _input: PhantomData<fn() -> I>,
}

impl<I> Clone for End<I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I> Copy for End<I> {}

impl<I> Parser for End<I> {
    type Input = I;
    type Output = ();
    type Computation = EndComputation<I>;

    fn computation(&self) -> Self::Computation {
        EndComputation {
            peeked: false,
            _input: PhantomData,
        }
    }
}

pub struct EndComputation<I> {
    peeked: bool,
    _input: PhantomData<fn() -> I>,
}

impl<I> Computation for EndComputation<I> {
    type Input = I;
    type Output = ();

    fn resume(&mut self, response: Option<Response<I>>) -> Resumed<I, ()> {
        if !self.peeked {
            self.peeked = true;
            return Ok(Step::Suspend(Request::Peek));
        }
        match response {
            Some(Response::EndOfInput) => Ok(Step::Complete(())),
            Some(Response::Item(found)) => Err(Failure::unexpected(found, "end of input")),
            Some(Response::Snapshot(_)) | None => {
                Err(Failure::protocol_violation("expected an item"))
            }
        }
    }
}

/// Succeed at end of input.
pub fn end<I>() -> End<I> {
    End {
        _input: PhantomData,
    }
}

//! Single-request parsers.
//!
//! Each issues exactly one request and decodes the driver's answer. They are
//! the building blocks for hand-written computations and for `then` chains
//! that need raw access to the cursor.

use std::marker::PhantomData;

use crate::error::Failure;
use crate::parser::Parser;
use crate::protocol::{
    expect_token, Computation, Request, Response, Resumed, SnapshotToken, Step,
};

type Decode<I, O> = fn(Response<I>) -> Result<O, Failure<I>>;

/// Parser issuing one fixed request.
pub struct Primitive<I, O> {
    request: Request,
    decode: Decode<I, O>,
}

impl<I, O> Clone for Primitive<I, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, O> Copy for Primitive<I, O> {}

impl<I, O> Parser for Primitive<I, O> {
    type Input = I;
    type Output = O;
    type Computation = PrimitiveComputation<I, O>;

    fn computation(&self) -> Self::Computation {
        PrimitiveComputation {
            request: Some(self.request),
            decode: self.decode,
            _input: PhantomData,
        }
    }
}

pub struct PrimitiveComputation<I, O> {
    /// Taken on the first resume.
    request: Option<Request>,
    decode: Decode<I, O>,
    _input: PhantomData<fn() -> I>,
}

impl<I, O> Computation for PrimitiveComputation<I, O> {
    type Input = I;
    type Output = O;

    fn resume(&mut self, response: Option<Response<I>>) -> Resumed<I, O> {
        if let Some(request) = self.request.take() {
            return Ok(Step::Suspend(request));
        }
        match response {
            Some(response) => (self.decode)(response).map(Step::Complete),
            None => Err(Failure::protocol_violation("resumed without an answer")),
        }
    }
}

fn item_or_end<I>(response: Response<I>) -> Result<Option<I>, Failure<I>> {
    match response {
        Response::Item(item) => Ok(Some(item)),
        Response::EndOfInput => Ok(None),
        Response::Snapshot(_) => Err(Failure::protocol_violation("expected an item")),
    }
}

fn item<I>(response: Response<I>) -> Result<I, Failure<I>> {
    item_or_end(response)?.ok_or_else(|| Failure::end_of_input("any item"))
}

fn token<I>(response: Response<I>) -> Result<SnapshotToken, Failure<I>> {
    expect_token(Some(response))
}

/// The item under the cursor, without consuming it. Fails at end of input.
pub fn peek<I>() -> Primitive<I, I> {
    Primitive {
        request: Request::Peek,
        decode: item,
    }
}

/// The item under the cursor, or `None` at end of input.
pub fn peek_or_end<I>() -> Primitive<I, Option<I>> {
    Primitive {
        request: Request::Peek,
        decode: item_or_end,
    }
}

/// Consume one item. Fails at end of input.
pub fn consume<I>() -> Primitive<I, I> {
    Primitive {
        request: Request::Consume,
        decode: item,
    }
}

/// Consume one item, or return `None` at end of input.
pub fn consume_or_end<I>() -> Primitive<I, Option<I>> {
    Primitive {
        request: Request::Consume,
        decode: item_or_end,
    }
}

/// Capture the cursor.
pub fn snapshot<I>() -> Primitive<I, SnapshotToken> {
    Primitive {
        request: Request::Snapshot,
        decode: token,
    }
}

/// Reset the cursor to `token`.
pub fn rollback<I>(token: SnapshotToken) -> Primitive<I, SnapshotToken> {
    Primitive {
        request: Request::Rollback(token),
        decode: self::token,
    }
}

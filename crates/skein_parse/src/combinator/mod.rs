//! The combinator algebra.
//!
//! Every combinator is a [`Parser`](crate::Parser) whose computation wraps
//! the computations of its children. Requests from a child surface
//! unchanged and responses flow back down untouched; only leaves, `choice`
//! and `repeat` issue requests of their own.
//!
//! Shared pieces (sub-parsers needed after start, user closures) are held
//! in `Rc`, so starting a computation never clones a grammar.

mod bind;
mod choice;
mod lazy;
mod leaf;
mod primitive;
mod recover;
mod repeat;
mod sequence;


pub use bind::{map, then, Map, MapComputation, Then, ThenComputation};
pub use choice::{choice, Choice, ChoiceComputation};
pub use lazy::{lazy, noop, Lazy, LazyComputation, Noop, NoopComputation};
pub use leaf::{
    any, end, literal, one_of, pattern, satisfy, AsText, End, EndComputation, Satisfy,
    SatisfyComputation,
};
pub use primitive::{
    consume, consume_or_end, peek, peek_or_end, rollback, snapshot, Primitive,
    PrimitiveComputation,
};
pub use recover::{
    catch, fatal, label, recover_with, Catch, CatchComputation, Fatal, FatalComputation, Label,
    LabelComputation, Recover, RecoverComputation,
};
pub use repeat::{repeat, Repeat, RepeatComputation};
pub use sequence::{
    all, between, sequence, All, AllComputation, Pair, PairComputation, Sequence,
};

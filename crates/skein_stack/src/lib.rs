//! Stack growth for deeply nested computations.
//!
//! A composed computation answers each `resume` by forwarding it down the
//! chain of computations it wraps. Recursive grammars built with `lazy` make
//! that chain as deep as the input is nested, so one resume can recurse
//! thousands of frames. The driver and `lazy` route every resume through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated segment
//! when the current one runs low.
//!
//! On `wasm32` the stack cannot be inspected or extended; both functions
//! degrade to plain calls.

/// Headroom below which a resume is moved to a new segment.
///
/// Covers the frames run between two guarded resumes: observer callbacks,
/// failure construction and aggregation in `choice`.
pub const MIN_HEADROOM: usize = 64 * 1024;

/// Size of each segment allocated when the headroom is exhausted.
pub const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if fewer than [`MIN_HEADROOM`] bytes
/// remain.
///
/// ```text
/// fn resume(&mut self, response: Option<Response<I>>) -> Resumed<I, O> {
///     ensure_sufficient_stack(|| self.inner.resume(response))
/// }
/// ```
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(not(target_arch = "wasm32"))]
    {
        stacker::maybe_grow(MIN_HEADROOM, SEGMENT_SIZE, f)
    }
    #[cfg(target_arch = "wasm32")]
    {
        f()
    }
}

/// Bytes left on the current stack segment; `None` where unobservable.
#[inline]
pub fn remaining_stack() -> Option<usize> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        stacker::remaining_stack()
    }
    #[cfg(target_arch = "wasm32")]
    {
        None
    }
}

#[cfg(test)]
mod tests;

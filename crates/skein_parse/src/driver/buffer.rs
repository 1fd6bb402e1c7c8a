//! Retained input window.
//!
//! Items are addressed by absolute offset into the stream. The buffer keeps
//! the suffix starting at `start`; everything before it has been committed
//! by a completed session and can never be revisited.

/// Window of not-yet-committed items.
pub(crate) struct Buffer<I> {
    items: Vec<I>,
    /// Absolute offset of `items[0]`.
    start: usize,
}

impl<I> Buffer<I> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            start: 0,
        }
    }

    /// Absolute offset of the first retained item.
    #[inline]
    pub(crate) fn start(&self) -> usize {
        self.start
    }

    /// Absolute offset one past the last buffered item.
    #[inline]
    pub(crate) fn end(&self) -> usize {
        self.start + self.items.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at an absolute offset, if retained.
    #[inline]
    pub(crate) fn get(&self, offset: usize) -> Option<&I> {
        offset
            .checked_sub(self.start)
            .and_then(|index| self.items.get(index))
    }

    /// Retained items in `from..to`, both absolute.
    ///
    /// Out-of-window bounds are clamped.
    pub(crate) fn slice(&self, from: usize, to: usize) -> &[I] {
        let lo = from.saturating_sub(self.start).min(self.items.len());
        let hi = to.saturating_sub(self.start).min(self.items.len());
        if lo >= hi {
            return &[];
        }
        &self.items[lo..hi]
    }

    pub(crate) fn extend(&mut self, items: impl IntoIterator<Item = I>) {
        self.items.extend(items);
    }

    /// Commit everything before `offset`.
    pub(crate) fn discard_before(&mut self, offset: usize) {
        let count = offset.saturating_sub(self.start).min(self.items.len());
        if count > 0 {
            self.items.drain(..count);
            self.start += count;
        }
    }
}

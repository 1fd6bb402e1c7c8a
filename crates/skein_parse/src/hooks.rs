//! Observer hooks fired by the driver at protocol points.
//!
//! Auxiliary state that must follow the cursor (line/column tracking,
//! statistics) lives in an observer so the driver stays ignorant of it.

/// Callbacks invoked by the driver.
///
/// All methods default to no-ops.
pub trait Observer<I, O> {
    /// An item was consumed, or re-entered by a forward restore.
    fn on_consume(&mut self, item: &I) {
        let _ = item;
    }

    /// The cursor moved backward; `dropped` are the un-consumed items in
    /// input order.
    fn on_rollback(&mut self, dropped: &[I]) {
        let _ = dropped;
    }

    /// A session completed; everything it consumed is now committed.
    fn on_complete(&mut self, output: &O) {
        let _ = output;
    }
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoopObserver;

impl<I, O> Observer<I, O> for NoopObserver {}

impl<I, O, H: Observer<I, O> + ?Sized> Observer<I, O> for &mut H {
    fn on_consume(&mut self, item: &I) {
        (**self).on_consume(item);
    }

    fn on_rollback(&mut self, dropped: &[I]) {
        (**self).on_rollback(dropped);
    }

    fn on_complete(&mut self, output: &O) {
        (**self).on_complete(output);
    }
}

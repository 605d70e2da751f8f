//! Progress notifications.
//!
//! Observers only watch; they cannot influence selection or output order.

/// Receives periodic notifications while sectors are streamed.
pub trait ProgressObserver {
    /// `done` sectors of `total` have been processed.
    fn on_progress(&mut self, done: u64, total: u64);

    /// All `total` sectors were written and the sinks flushed.
    fn on_finish(&mut self, _total: u64) {}
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _done: u64, _total: u64) {}
}

impl<F: FnMut(u64, u64)> ProgressObserver for F {
    fn on_progress(&mut self, done: u64, total: u64) {
        self(done, total)
    }
}

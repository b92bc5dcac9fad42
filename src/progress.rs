//! Progress-callback trait for per-item events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] into
//! [`crate::config::DownloadConfig`] or [`crate::config::BinderConfig`] to
//! receive an event as each image is downloaded or placed. The CLI turns
//! these into an indicatif progress bar; library callers can forward them
//! anywhere.
//!
//! # Example
//!
//! ```rust
//! use tcg_binder::RunProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Counter(AtomicUsize);
//!
//! impl RunProgressCallback for Counter {
//!     fn on_item_complete(&self, _index: usize, _total: usize, label: &str) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("done: {label}");
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called as a run processes each item.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait RunProgressCallback: Send + Sync {
    /// Called once before the first item, with the number of items.
    fn on_run_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before an item is processed.
    fn on_item_start(&self, index: usize, total: usize, label: &str) {
        let _ = (index, total, label);
    }

    /// Called when an item succeeded.
    fn on_item_complete(&self, index: usize, total: usize, label: &str) {
        let _ = (index, total, label);
    }

    /// Called when an item was skipped because of an error.
    fn on_item_error(&self, index: usize, total: usize, label: &str, error: &str) {
        let _ = (index, total, label, error);
    }

    /// Called once after every item has been attempted.
    fn on_run_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in the run configs.
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        total: AtomicUsize,
        succeeded: AtomicUsize,
    }

    impl RunProgressCallback for TrackingCallback {
        fn on_run_start(&self, total: usize) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn on_item_start(&self, _index: usize, _total: usize, _label: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_item_complete(&self, _index: usize, _total: usize, _label: &str) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_item_error(&self, _index: usize, _total: usize, _label: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_run_complete(&self, _total: usize, success_count: usize) {
            self.succeeded.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(3);
        cb.on_item_start(1, 3, "624103");
        cb.on_item_complete(1, 3, "624103");
        cb.on_item_error(2, 3, "624104", "HTTP 404");
        cb.on_run_complete(3, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_run_start(3);
        for i in 1..=3 {
            tracker.on_item_start(i, 3, "x");
        }
        tracker.on_item_complete(1, 3, "x");
        tracker.on_item_complete(2, 3, "x");
        tracker.on_item_error(3, 3, "x", "decode failed");
        tracker.on_run_complete(3, 2);

        assert_eq!(tracker.total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.succeeded.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_item_complete(1, 10, "a");
    }
}

//! Progress-callback trait for per-chunk processing events.
//!
//! Inject an [`Arc<dyn ProcessingProgressCallback>`] via
//! [`crate::config::ProcessingConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the document.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a broadcast channel, a WebSocket, a database record, or
//! a terminal progress bar without the library knowing anything about how the
//! host application communicates. Chunks are processed strictly one at a
//! time, so events for a given run always arrive in order.

use std::sync::Arc;

/// Called by the pipeline as it processes each chunk.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The trait is `Send + Sync` so an implementation can
/// be shared with the task driving the pipeline.
pub trait ProcessingProgressCallback: Send + Sync {
    /// Called once after chunking, before any model call.
    ///
    /// `total_chunks` is 1 on the small-document path.
    fn on_processing_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called just before a chunk's model call is issued.
    fn on_chunk_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a chunk transforms successfully.
    ///
    /// `output_len` is the byte length of the produced Markdown.
    fn on_chunk_complete(&self, index: usize, total: usize, output_len: usize) {
        let _ = (index, total, output_len);
    }

    /// Called when a chunk's model call fails and a placeholder is recorded.
    fn on_chunk_error(&self, index: usize, total: usize, error: String) {
        let _ = (index, total, error);
    }

    /// Called once after every chunk has been attempted.
    fn on_processing_complete(&self, total_chunks: usize, success_count: usize) {
        let _ = (total_chunks, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ProcessingProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessingConfig`].
pub type ProgressCallback = Arc<dyn ProcessingProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        final_successes: AtomicUsize,
    }

    impl ProcessingProgressCallback for TrackingCallback {
        fn on_chunk_start(&self, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_complete(&self, _index: usize, _total: usize, _output_len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_error(&self, _index: usize, _total: usize, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_processing_complete(&self, _total_chunks: usize, success_count: usize) {
            self.final_successes.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_processing_start(3);
        cb.on_chunk_start(0, 3);
        cb.on_chunk_complete(0, 3, 42);
        cb.on_chunk_error(1, 3, "some error".to_string());
        cb.on_processing_complete(3, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            final_successes: AtomicUsize::new(0),
        };

        tracker.on_chunk_start(0, 2);
        tracker.on_chunk_complete(0, 2, 100);
        tracker.on_chunk_start(1, 2);
        tracker.on_chunk_error(1, 2, "model timeout".to_string());
        tracker.on_processing_complete(2, 1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.final_successes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ProcessingProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_processing_start(10);
        cb.on_chunk_complete(0, 10, 512);
    }
}

//! Progress-callback trait for per-section conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline distills each section.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a WebSocket, a log file, or a terminal
//! progress bar — without the library knowing anything about how the host
//! application communicates. The trait is `Send + Sync` so it works when
//! sections are distilled concurrently.

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each section.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. When `concurrency > 1`, the per-section methods may
/// be called from different tasks; implementations must synchronise shared
/// mutable state themselves.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after segmentation, before any section is distilled.
    ///
    /// `found` is the number of sections discovered in the root document;
    /// `processing` is the number that will actually be distilled after the
    /// section cap is applied (`processing <= found`).
    fn on_run_start(&self, found: usize, processing: usize) {
        let _ = (found, processing);
    }

    /// Called just before the generation request is sent for a section.
    fn on_section_start(&self, index: usize, total: usize, title: &str) {
        let _ = (index, total, title);
    }

    /// Called when a section is successfully distilled.
    ///
    /// `latex_len` is the byte length of the produced frame block.
    fn on_section_complete(&self, index: usize, total: usize, latex_len: usize) {
        let _ = (index, total, latex_len);
    }

    /// Called when a section falls back to the placeholder frame after all
    /// retries are exhausted. The run continues; this is a warning, not an
    /// abort.
    fn on_section_fallback(&self, index: usize, total: usize, error: String) {
        let _ = (index, total, error);
    }

    /// Called once just before the external LaTeX compiler is invoked.
    fn on_compile_start(&self) {}

    /// Called once after the deck is written (and compilation attempted,
    /// when enabled).
    ///
    /// `compiled` is `None` when compilation was disabled, otherwise whether
    /// the compiler exited cleanly.
    fn on_run_complete(&self, total: usize, fallbacks: usize, compiled: Option<bool>) {
        let _ = (total, fallbacks, compiled);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        fallbacks: AtomicUsize,
        found: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_run_start(&self, found: usize, _processing: usize) {
            self.found.store(found, Ordering::SeqCst);
        }
        fn on_section_start(&self, _index: usize, _total: usize, _title: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_section_complete(&self, _index: usize, _total: usize, _latex_len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_section_fallback(&self, _index: usize, _total: usize, _error: String) {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(5, 5);
        cb.on_section_start(1, 5, "Introduction");
        cb.on_section_complete(1, 5, 240);
        cb.on_section_fallback(2, 5, "timeout".to_string());
        cb.on_compile_start();
        cb.on_run_complete(5, 1, Some(true));
    }

    #[test]
    fn tracking_callback_receives_events() {
        let cb = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
            found: AtomicUsize::new(0),
        };

        cb.on_run_start(4, 3);
        cb.on_section_start(1, 3, "A");
        cb.on_section_complete(1, 3, 100);
        cb.on_section_start(2, 3, "B");
        cb.on_section_fallback(2, 3, "HTTP 429".to_string());
        cb.on_section_start(3, 3, "C");
        cb.on_section_complete(3, 3, 150);

        assert_eq!(cb.found.load(Ordering::SeqCst), 4);
        assert_eq!(cb.starts.load(Ordering::SeqCst), 3);
        assert_eq!(cb.completes.load(Ordering::SeqCst), 2);
        assert_eq!(cb.fallbacks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_is_send() {
        fn assert_send<T: Send + Sync>() {}
        assert_send::<NoopProgressCallback>();

        let cb: Arc<dyn ConversionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_section_fallback(1, 1, "an error".to_string());
    }
}

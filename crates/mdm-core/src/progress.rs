//! Aggregated download progress shared by all fetch workers.
//!
//! One `ProgressTracker` is created per format download and cloned into every
//! worker. Increments go to an atomic counter and to a single terminal bar;
//! both are safe to update from many threads at once.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const BAR_TEMPLATE: &str =
    "{bytes:>10}/{total_bytes:<10} [{wide_bar}] {binary_bytes_per_sec:>12} {eta:>4}";

struct Inner {
    done: AtomicU64,
    bar: ProgressBar,
}

/// Cloneable handle to one shared progress counter.
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<Inner>,
}

impl ProgressTracker {
    /// Tracker with a visible terminal bar whose length is `total` bytes.
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        Self::with_bar(total, ProgressBar::new(total).with_style(style))
    }

    /// Tracker that counts but never draws (tests, non-interactive runs).
    pub fn hidden(total: u64) -> Self {
        Self::with_bar(total, ProgressBar::hidden())
    }

    fn with_bar(total: u64, bar: ProgressBar) -> Self {
        bar.set_length(total);
        Self {
            inner: Arc::new(Inner {
                done: AtomicU64::new(0),
                bar,
            }),
        }
    }

    /// Credit `n` bytes.
    pub fn add(&self, n: u64) {
        self.inner.done.fetch_add(n, Ordering::Relaxed);
        self.inner.bar.inc(n);
    }

    /// Bytes credited so far.
    pub fn position(&self) -> u64 {
        self.inner.done.load(Ordering::Relaxed)
    }

    /// Mark the transfer complete and leave the bar on screen.
    pub fn finish(&self) {
        self.inner.bar.finish();
    }

    /// Stop drawing after a failure, leaving the last state visible.
    pub fn abandon(&self) {
        self.inner.bar.abandon();
    }

    /// Runs `f` with the bar hidden, e.g. to ask the operator a question.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.inner.bar.suspend(f)
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("done", &self.position())
            .field("total", &self.inner.bar.length())
            .finish()
    }
}

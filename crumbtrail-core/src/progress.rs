use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Percent reported as soon as a top-level crawl starts.
const STARTING_PERCENT: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub processed: usize,
    pub percent: u8,
    pub running: bool,
}

/// Callback for reporting crawl progress
pub type ProgressCallback = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Counters shared by every level of one recursive crawl.
///
/// `total` grows as deeper levels are discovered, so the percentage is an
/// online estimate and can move backwards.
#[derive(Default)]
pub struct CrawlProgress {
    total: AtomicUsize,
    processed: AtomicUsize,
    running: AtomicBool,
    callback: Option<ProgressCallback>,
}

impl CrawlProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            ..Self::default()
        }
    }

    pub(crate) fn start(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.processed.store(0, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        self.notify();
    }

    pub(crate) fn add_total(&self, more: usize) {
        self.total.fetch_add(more, Ordering::SeqCst);
        self.notify();
    }

    pub(crate) fn mark_processed(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.notify();
    }

    pub(crate) fn finish(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.notify();
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let total = self.total.load(Ordering::SeqCst);
        let processed = self.processed.load(Ordering::SeqCst);
        let running = self.running.load(Ordering::SeqCst);
        let percent = if !running {
            if total > 0 { 100 } else { 0 }
        } else if processed == 0 || total == 0 {
            STARTING_PERCENT
        } else {
            ((processed * 100) / total).min(100) as u8
        };
        ProgressSnapshot {
            total,
            processed,
            percent,
            running,
        }
    }

    fn notify(&self) {
        if let Some(ref callback) = self.callback {
            callback(self.snapshot());
        }
    }
}

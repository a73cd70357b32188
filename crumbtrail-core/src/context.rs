use crate::model::{BrokenLink, SearchMatch};
use crate::progress::{CrawlProgress, ProgressCallback, ProgressSnapshot};
use crate::search::SearchTerms;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// Cooperative cancellation shared by every branch of a crawl.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as self, so this only ends on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Accumulators shared across one recursive crawl.
///
/// Sibling branches may run concurrently, so the sinks sit behind mutexes
/// and the progress counters are atomics.
#[derive(Default)]
pub struct CrawlContext {
    progress: CrawlProgress,
    broken_links: Mutex<Vec<BrokenLink>>,
    search: Option<SearchTerms>,
    matches: Mutex<Vec<SearchMatch>>,
    cancel: CancelHandle,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, terms: SearchTerms) -> Self {
        if !terms.is_empty() {
            self.search = Some(terms);
        }
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = CrawlProgress::with_callback(callback);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn progress(&self) -> &CrawlProgress {
        &self.progress
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }

    pub fn search_terms(&self) -> Option<&SearchTerms> {
        self.search.as_ref()
    }

    pub(crate) async fn record_broken(&self, link: BrokenLink) {
        self.broken_links.lock().await.push(link);
    }

    pub(crate) async fn record_match(&self, found: SearchMatch) {
        self.matches.lock().await.push(found);
    }

    /// Keep one match per URL, first one wins.
    pub(crate) async fn dedup_matches(&self) {
        let mut matches = self.matches.lock().await;
        let mut seen = HashSet::new();
        matches.retain(|m| seen.insert(m.url.clone()));
    }

    pub async fn broken_links(&self) -> Vec<BrokenLink> {
        self.broken_links.lock().await.clone()
    }

    pub async fn search_matches(&self) -> Vec<SearchMatch> {
        self.matches.lock().await.clone()
    }

    /// Drain both sinks, leaving them empty.
    pub async fn take_results(&self) -> (Vec<BrokenLink>, Vec<SearchMatch>) {
        let broken = std::mem::take(&mut *self.broken_links.lock().await);
        let matches = std::mem::take(&mut *self.matches.lock().await);
        (broken, matches)
    }
}

use crate::error::{Result, ScanError};
use crate::fetcher::Fetcher;
use crate::result::Document;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// In-memory [`Fetcher`] serving canned pages. Handy for dry runs and for
/// exercising the IA passes without a network.
#[derive(Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, (u16, String)>,
    hits: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page served with status 200.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.with_status(url, 200, html)
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), (status, html.into()));
        self
    }

    /// How many times `url` was requested.
    pub fn hits(&self, url: &str) -> usize {
        self.hits
            .lock()
            .map(|h| h.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Document> {
        debug!("Serving {} from memory", url);
        self.total.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut hits) = self.hits.lock() {
            *hits.entry(url.to_string()).or_insert(0) += 1;
        }

        match self.pages.get(url) {
            Some((status, html)) if (200..300).contains(status) => {
                Ok(Document::new(url, *status, html.clone()))
            }
            Some((status, _)) => Err(ScanError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(ScanError::NotFound(url.to_string())),
        }
    }
}

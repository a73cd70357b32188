use crate::model::{BreadcrumbNode, PageRecord};
use crumbtrail_scanner::Fetcher;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A user-supplied starting page, optionally paired with its prototype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUrl {
    pub url: String,
    pub prototype_url: Option<String>,
}

impl SeedUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prototype_url: None,
        }
    }

    pub fn with_prototype(mut self, prototype_url: impl Into<String>) -> Self {
        self.prototype_url = Some(prototype_url.into());
        self
    }
}

/// Fetch every seed and record its H1 and breadcrumb trail.
///
/// Seeds that fail to load are logged and left out; they simply take no
/// part in root detection.
pub async fn collect_page_records<F: Fetcher + ?Sized>(fetcher: &F, seeds: &[SeedUrl]) -> Vec<PageRecord> {
    info!("Collecting breadcrumbs for {} seed page(s)", seeds.len());
    let mut records = Vec::with_capacity(seeds.len());

    for seed in seeds {
        if seed.url.trim().is_empty() {
            continue;
        }
        match fetcher.fetch(&seed.url).await {
            Ok(document) => {
                let meta = document.page_meta();
                let breadcrumb = meta
                    .breadcrumb
                    .into_iter()
                    .map(|c| BreadcrumbNode::new(c.label, c.url))
                    .collect();
                let mut record = PageRecord::new(seed.url.clone(), meta.h1, breadcrumb);
                record.prototype_url = seed.prototype_url.clone();
                records.push(record);
            }
            Err(e) => warn!("Error fetching {}: {}", seed.url, e),
        }
    }

    records
}

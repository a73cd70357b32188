//! Depth-bounded recursive crawl that turns seed URLs into an IA forest.
//!
//! Every child candidate comes from the parent's `<main>` links, but it is
//! only accepted when its own breadcrumb ends at that parent. Navigation
//! chrome and cross references never make it into the tree.

use crate::context::CrawlContext;
use crate::model::{BrokenLink, PageNode, SearchMatch, TreeNode};
use crumbtrail_scanner::Fetcher;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Caps how many children are crawled below known high-fanout index pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanOutPolicy {
    pub cap: usize,
    pub capped_pages: HashSet<String>,
}

impl Default for FanOutPolicy {
    fn default() -> Self {
        Self {
            cap: 5,
            capped_pages: [
                "https://www.canada.ca/en/revenue-agency/services/forms-publications/forms.html",
                "https://www.canada.ca/fr/agence-revenu/services/formulaires-publications/formulaires.html",
                "https://www.canada.ca/en/revenue-agency/services/forms-publications/publications.html",
                "https://www.canada.ca/fr/agence-revenu/services/formulaires-publications/publications.html",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl FanOutPolicy {
    pub fn uncapped() -> Self {
        Self {
            cap: usize::MAX,
            capped_pages: HashSet::new(),
        }
    }

    /// Number of child links to follow out of `total` found on `url`.
    pub fn limit_for(&self, url: &str, total: usize) -> usize {
        if self.capped_pages.contains(url) {
            total.min(self.cap)
        } else {
            total
        }
    }
}

pub struct TreeCrawler<F: Fetcher + ?Sized> {
    fetcher: Arc<F>,
    fan_out: FanOutPolicy,
    concurrency: usize,
    permits: Arc<Semaphore>,
}

impl<F: Fetcher + ?Sized> TreeCrawler<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            fan_out: FanOutPolicy::default(),
            concurrency: 1,
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn with_fan_out(mut self, fan_out: FanOutPolicy) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Fetch up to `workers` pages at once across the whole crawl.
    /// One worker keeps siblings strictly sequential.
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self.permits = Arc::new(Semaphore::new(self.concurrency));
        self
    }

    /// Top-level crawl: resets progress, and finalizes it together with the
    /// search matches once the whole tree is built.
    pub async fn crawl(&self, urls: &[String], depth: usize, ctx: &CrawlContext) -> Vec<TreeNode> {
        info!("Crawling {} url(s) to depth {}", urls.len(), depth);
        self.crawl_from(urls.to_vec(), depth, None, 0, ctx).await
    }

    /// Crawl `urls` as children of `parent_url`, tracking progress like a
    /// top-level crawl. Search matches are left as found.
    pub async fn crawl_under(
        &self,
        urls: &[String],
        depth: usize,
        parent_url: &str,
        ctx: &CrawlContext,
    ) -> Vec<TreeNode> {
        info!(
            "Crawling {} url(s) under {} to depth {}",
            urls.len(),
            parent_url,
            depth
        );
        ctx.progress().start(urls.len());
        let nodes = self
            .crawl_from(urls.to_vec(), depth, Some(parent_url.to_string()), 0, ctx)
            .await;
        ctx.progress().finish();
        nodes
    }

    /// Crawl `urls` as children of `parent_url` at recursion `level`.
    ///
    /// With a parent, a page is kept only if the last entry of its
    /// breadcrumb is exactly `parent_url`. Only the call without a parent
    /// at level 0 owns resetting and finalizing the shared accumulators.
    pub fn crawl_from<'a>(
        &'a self,
        urls: Vec<String>,
        depth: usize,
        parent_url: Option<String>,
        level: usize,
        ctx: &'a CrawlContext,
    ) -> BoxFuture<'a, Vec<TreeNode>> {
        async move {
            if depth == 0 {
                return Vec::new();
            }

            let top_level = parent_url.is_none() && level == 0;
            if top_level {
                ctx.progress().start(urls.len());
            }

            let parent = parent_url.as_deref();
            let nodes: Vec<TreeNode> = stream::iter(urls)
                .map(|url| self.visit(url, depth, parent, level, ctx))
                .buffered(self.concurrency)
                .filter_map(|node| async move { node })
                .collect()
                .await;

            if top_level {
                ctx.progress().finish();
                ctx.dedup_matches().await;
                info!("Crawl finished with {} top-level node(s)", nodes.len());
            }

            nodes
        }
        .boxed()
    }

    async fn visit(
        &self,
        url: String,
        depth: usize,
        parent_url: Option<&str>,
        level: usize,
        ctx: &CrawlContext,
    ) -> Option<TreeNode> {
        let cancel = ctx.cancel_handle();
        if cancel.is_cancelled() {
            return None;
        }

        let fetched = {
            let _permit = self.permits.acquire().await.ok()?;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Cancelled before {} was fetched", url);
                    return None;
                }
                result = self.fetcher.fetch(&url) => result,
            }
        };
        ctx.progress().mark_processed();

        let document = match fetched {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                ctx.record_broken(BrokenLink {
                    parent_url: parent_url.map(String::from),
                    url,
                    status: e.status(),
                })
                .await;
                return None;
            }
        };
        let meta = document.page_meta();

        if let Some(terms) = ctx.search_terms()
            && terms.matches(&meta.body_text)
        {
            let h1 = if meta.h1.is_empty() {
                "Missing H1".to_string()
            } else {
                meta.h1.clone()
            };
            ctx.record_match(SearchMatch {
                url: url.clone(),
                h1,
            })
            .await;
        }

        if let Some(parent) = parent_url
            && meta.breadcrumb_parent() != Some(parent)
        {
            debug!("Skipping {}: breadcrumb does not end at {}", url, parent);
            return None;
        }

        let mut node = PageNode {
            label: meta.h1.clone(),
            url: url.clone(),
            original_parent_url: parent_url.map(String::from),
            is_crawled: depth > 1,
            crawl_depth: depth,
            not_orphan: true,
            ..Default::default()
        };

        if depth > 1 && !meta.main_links.is_empty() {
            let total = meta.main_links.len();
            let limit = self.fan_out.limit_for(&url, total);
            debug!(
                "Crawling {} of {} link(s) from {} at depth {}",
                limit, total, url, depth
            );

            let links = meta.main_links[..limit].to_vec();
            ctx.progress().add_total(links.len());
            node.children = self
                .crawl_from(links, depth - 1, Some(url.clone()), level + 1, ctx)
                .await;

            // A cut-short child batch leaves the page to be crawled again
            if cancel.is_cancelled() {
                debug!("Crawl of {} cancelled with partial children", url);
                node.is_crawled = false;
            }

            if total > limit {
                node.children.push(TreeNode::Overflow {
                    parent_url: url,
                    hidden: total - limit,
                });
            }
        }

        Some(TreeNode::Page(node))
    }
}

//! Breadcrumb chain validation.
//!
//! Chains are built from seed pages, reduced to the most specific trail per
//! path, sorted, and then every parent to child hop is checked by fetching
//! the parent and looking for a link to the child. A final pass marks crawl
//! roots and propagates breaks down the rest of each chain.

use crate::model::{BreadcrumbChain, BreadcrumbNode, Highlight, HopStatus, PageRecord};
use crate::roots::resolve_roots;
use crumbtrail_scanner::Fetcher;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Build one chain per record: the breadcrumb entries followed by a node
/// for the page itself.
pub fn build_chains(records: &[PageRecord]) -> Vec<BreadcrumbChain> {
    records
        .iter()
        .map(|record| {
            let mut chain: BreadcrumbChain = record
                .breadcrumb
                .iter()
                .enumerate()
                .map(|(i, crumb)| BreadcrumbNode {
                    highlight: if i == 0 {
                        Highlight::BreadcrumbRoot
                    } else {
                        Highlight::Pending
                    },
                    status: HopStatus::Pending,
                    ..crumb.clone()
                })
                .collect();
            chain.push(BreadcrumbNode {
                prototype_url: record.prototype_url.clone(),
                ..BreadcrumbNode::new(record.h1.clone(), record.url.clone())
            });
            chain
        })
        .collect()
}

fn is_strict_prefix(short: &BreadcrumbChain, long: &BreadcrumbChain) -> bool {
    long.len() > short.len() && short.iter().zip(long).all(|(a, b)| a.url == b.url)
}

/// Drop every chain that is a prefix of a strictly longer chain.
pub fn dedup_chains(chains: Vec<BreadcrumbChain>) -> Vec<BreadcrumbChain> {
    let keep: Vec<bool> = chains
        .iter()
        .map(|chain| !chains.iter().any(|other| is_strict_prefix(chain, other)))
        .collect();

    chains
        .into_iter()
        .zip(keep)
        .filter_map(|(chain, keep)| keep.then_some(chain))
        .collect()
}

fn compare_chains(a: &BreadcrumbChain, b: &BreadcrumbChain) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.url.cmp(&y.url) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Lexicographic by URL at each position; the shorter chain wins ties.
pub fn sort_chains(chains: &mut [BreadcrumbChain]) {
    chains.sort_by(compare_chains);
}

/// Checks breadcrumb hops against the parent's actual links.
pub struct BreadcrumbValidator<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    /// Parent URL -> its outgoing links, or the fetch error
    links: HashMap<String, Result<HashSet<String>, String>>,
}

impl<'a, F: Fetcher + ?Sized> BreadcrumbValidator<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self {
            fetcher,
            links: HashMap::new(),
        }
    }

    /// Number of distinct parent pages fetched so far.
    pub fn fetched_parents(&self) -> usize {
        self.links.len()
    }

    async fn links_of(&mut self, parent_url: &str) -> Result<&HashSet<String>, String> {
        if !self.links.contains_key(parent_url) {
            let outcome = match self.fetcher.fetch(parent_url).await {
                Ok(document) => Ok(document.page_meta().all_links.into_iter().collect()),
                Err(e) => {
                    warn!("Error validating breadcrumb links on {}: {}", parent_url, e);
                    Err(e.to_string())
                }
            };
            self.links.insert(parent_url.to_string(), outcome);
        }
        match &self.links[parent_url] {
            Ok(links) => Ok(links),
            Err(e) => Err(e.clone()),
        }
    }

    /// Mark every hop of every chain valid, orphan, or errored.
    pub async fn validate(&mut self, chains: &mut [BreadcrumbChain]) {
        info!("Validating {} breadcrumb chain(s)", chains.len());
        for chain in chains.iter_mut() {
            for i in 1..chain.len() {
                let parent_url = chain[i - 1].url.clone();
                let child = &mut chain[i];

                if parent_url.is_empty() || child.url.is_empty() {
                    child.status = HopStatus::MissingLink;
                    child.highlight = Highlight::Error;
                    continue;
                }

                let status = match self.links_of(&parent_url).await {
                    Ok(links) if links.contains(&child.url) => HopStatus::Valid,
                    Ok(_) => HopStatus::Orphan,
                    Err(reason) => HopStatus::FetchError(reason),
                };
                debug!("{} -> {}: {:?}", parent_url, child.url, status);

                child.highlight = match status {
                    HopStatus::Valid => Highlight::Valid,
                    HopStatus::Orphan => Highlight::Orphan,
                    _ => Highlight::Error,
                };
                child.status = status;
            }
        }
    }
}

/// Result of the highlight pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HighlightSummary {
    pub has_break_before_root: bool,
    pub has_break_after_root: bool,
}

/// Mark roots and descendants and propagate breaks after the root.
///
/// Nodes before the first root are neutral context. After a root, the first
/// broken hop flags everything below it, even hops that are valid on their
/// own, since the root can no longer reach them. A later root in the same
/// chain starts over.
pub fn highlight_chains(chains: &mut [BreadcrumbChain], roots: &[PageRecord]) -> HighlightSummary {
    let root_set: HashSet<&str> = roots.iter().map(|r| r.url.as_str()).collect();
    let descendant_set: HashSet<&str> = roots
        .iter()
        .flat_map(|r| r.descendants.iter().map(String::as_str))
        .collect();

    let mut summary = HighlightSummary::default();

    for chain in chains.iter_mut() {
        let mut after_root = false;
        let mut broken = false;

        for crumb in chain.iter_mut() {
            crumb.is_root = root_set.contains(crumb.url.as_str());
            crumb.is_descendant = descendant_set.contains(crumb.url.as_str());

            if crumb.is_root {
                after_root = true;
                broken = false;
                crumb.highlight = Highlight::CrawlRoot;
            } else if after_root {
                if broken {
                    crumb.highlight = Highlight::DescendantOfOrphan;
                } else if crumb.status.is_break() {
                    broken = true;
                    summary.has_break_after_root = true;
                }
            } else {
                if crumb.status.is_break() {
                    summary.has_break_before_root = true;
                }
                crumb.highlight = Highlight::Context;
            }

            crumb.emphasized = crumb.is_descendant;
        }
    }

    summary
}

/// Output of a full classification pass over the seed pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    pub roots: Vec<PageRecord>,
    pub chains: Vec<BreadcrumbChain>,
    pub has_break_before_root: bool,
    pub has_break_after_root: bool,
}

/// Resolve roots, then build, reduce, sort, validate and highlight chains.
pub async fn classify<F: Fetcher + ?Sized>(fetcher: &F, records: &[PageRecord]) -> Classification {
    let roots = resolve_roots(records);
    info!("Found {} root(s) among {} page(s)", roots.len(), records.len());

    let mut chains = dedup_chains(build_chains(records));
    sort_chains(&mut chains);

    let mut validator = BreadcrumbValidator::new(fetcher);
    validator.validate(&mut chains).await;
    debug!("Validation fetched {} parent page(s)", validator.fetched_parents());

    let summary = highlight_chains(&mut chains, &roots);
    if summary.has_break_before_root {
        warn!("Breadcrumb break found before a root; context pages may be misplaced");
    }
    if summary.has_break_after_root {
        warn!("Breadcrumb break found after a root; some pages will not be reached by the crawl");
    }

    Classification {
        roots,
        chains,
        has_break_before_root: summary.has_break_before_root,
        has_break_after_root: summary.has_break_after_root,
    }
}

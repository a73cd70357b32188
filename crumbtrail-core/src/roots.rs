//! Root detection over a set of seed pages.
//!
//! A page is a root when no other known page claims it as a descendant
//! through its breadcrumb. Each root also learns how deep a crawl has to go
//! to reach all of its breadcrumb-confirmed descendants.

use crate::model::PageRecord;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Every root gets at least the root page plus one level of children.
pub const MIN_ROOT_DEPTH: usize = 2;

/// Return the roots among `pages`, with `descendants` and `min_depth` filled in.
///
/// Descendants are recomputed from scratch, so running this twice over the
/// same input gives the same answer.
pub fn resolve_roots(pages: &[PageRecord]) -> Vec<PageRecord> {
    let index: HashMap<&str, usize> = pages
        .iter()
        .enumerate()
        .map(|(i, p)| (p.url.as_str(), i))
        .collect();

    let mut descendants: Vec<Vec<String>> = vec![Vec::new(); pages.len()];
    for page in pages {
        for crumb in &page.breadcrumb {
            let Some(&ancestor) = index.get(crumb.url.as_str()) else {
                continue;
            };
            // Breadcrumbs that list the page itself are skipped
            if pages[ancestor].url == page.url {
                continue;
            }
            if !descendants[ancestor].contains(&page.url) {
                descendants[ancestor].push(page.url.clone());
            }
        }
    }

    warn_on_cycles(pages, &index, &descendants);

    let descendant_set: HashSet<&str> = descendants
        .iter()
        .flat_map(|d| d.iter().map(String::as_str))
        .collect();

    let mut roots = Vec::new();
    for (i, page) in pages.iter().enumerate() {
        if descendant_set.contains(page.url.as_str()) {
            continue;
        }
        let mut root = page.clone();
        root.descendants = descendants[i].clone();
        root.min_depth = min_depth_for(&root, pages, &index);
        debug!(
            "Root {} has {} descendant(s), min depth {}",
            root.url,
            root.descendants.len(),
            root.min_depth
        );
        roots.push(root);
    }

    roots
}

/// Hops from the root to its furthest descendant, plus one because a page
/// never lists itself in its own breadcrumb.
fn min_depth_for(root: &PageRecord, pages: &[PageRecord], index: &HashMap<&str, usize>) -> usize {
    let mut min_depth = MIN_ROOT_DEPTH;
    for child_url in &root.descendants {
        let Some(&child) = index.get(child_url.as_str()) else {
            continue;
        };
        let trail = &pages[child].breadcrumb;
        if let Some(position) = trail.iter().position(|c| c.url == root.url) {
            min_depth = min_depth.max(trail.len() + 1 - position);
        }
    }
    min_depth
}

fn warn_on_cycles(pages: &[PageRecord], index: &HashMap<&str, usize>, descendants: &[Vec<String>]) {
    for (i, page) in pages.iter().enumerate() {
        for child_url in &descendants[i] {
            let Some(&child) = index.get(child_url.as_str()) else {
                continue;
            };
            // Report each pair once
            if i < child && descendants[child].contains(&page.url) {
                warn!(
                    "Breadcrumb cycle between {} and {}: neither can be a root",
                    page.url, child_url
                );
            }
        }
    }
}

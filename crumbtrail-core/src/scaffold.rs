//! Seeding the IA forest from validated breadcrumb chains, and growing it
//! by crawling from the detected roots.

use crate::context::CrawlContext;
use crate::merge::merge_trees;
use crate::model::{BreadcrumbChain, Highlight, PageNode, PageRecord, TreeNode, find_page_mut};
use crate::roots::MIN_ROOT_DEPTH;
use crate::tree::TreeCrawler;
use crumbtrail_scanner::Fetcher;
use std::collections::HashMap;
use tracing::{debug, info};

/// Insert every chain as a path of page nodes, sharing nodes by URL at each level.
pub fn build_context_tree(chains: &[BreadcrumbChain], roots: &[PageRecord]) -> Vec<TreeNode> {
    let root_depths: HashMap<&str, usize> = roots
        .iter()
        .map(|r| (r.url.as_str(), r.min_depth))
        .collect();

    let mut forest: Vec<TreeNode> = Vec::new();
    for chain in chains {
        let mut level = &mut forest;
        let mut parent_url: Option<String> = None;

        for crumb in chain {
            if crumb.url.is_empty() {
                debug!("Breadcrumb '{}' has no link, ending its chain", crumb.label);
                break;
            }

            let position = level.iter().position(|n| n.url() == Some(crumb.url.as_str()));
            let index = match position {
                Some(i) => i,
                None => {
                    level.push(TreeNode::Page(PageNode {
                        label: crumb.label.clone(),
                        url: crumb.url.clone(),
                        original_parent_url: parent_url.clone(),
                        is_root: crumb.is_root,
                        is_crawled: false,
                        crawl_depth: root_depths.get(crumb.url.as_str()).copied().unwrap_or(0),
                        is_user_added: crumb.is_root || crumb.is_descendant,
                        not_orphan: crumb.valid() != Some(false),
                        context_only: crumb.highlight == Highlight::Context,
                        prototype_url: crumb.prototype_url.clone(),
                        children: Vec::new(),
                    }));
                    level.len() - 1
                }
            };

            parent_url = Some(crumb.url.clone());
            level = match &mut level[index] {
                TreeNode::Page(page) => &mut page.children,
                TreeNode::Container(container) => &mut container.children,
                TreeNode::Overflow { .. } => break,
            };
        }
    }

    forest
}

fn collect_roots(nodes: &[TreeNode], out: &mut Vec<(String, usize)>) {
    for node in nodes {
        if let TreeNode::Page(page) = node
            && page.is_root
        {
            out.push((page.url.clone(), page.crawl_depth));
        }
        collect_roots(node.children(), out);
    }
}

/// Crawl below one node and merge the result into it.
///
/// Returns false when `url` is not in the tree or the crawl produced nothing.
pub async fn refresh_node<F: Fetcher + ?Sized>(
    crawler: &TreeCrawler<F>,
    tree: &mut [TreeNode],
    url: &str,
    depth: usize,
    ctx: &CrawlContext,
) -> bool {
    if find_page_mut(tree, url).is_none() {
        return false;
    }

    let crawled = crawler.crawl(&[url.to_string()], depth, ctx).await;
    let Some(TreeNode::Page(built)) = crawled.into_iter().next() else {
        return false;
    };

    match find_page_mut(tree, url) {
        Some(node) => {
            let existing = std::mem::take(&mut node.children);
            node.children = merge_trees(existing, built.children);
            node.is_crawled |= built.is_crawled;
            true
        }
        None => false,
    }
}

/// Crawl from every node flagged as a root, at least two levels deep.
///
/// Roots are unflagged afterwards so a second call does not crawl them again.
pub async fn crawl_from_roots<F: Fetcher + ?Sized>(
    crawler: &TreeCrawler<F>,
    tree: &mut [TreeNode],
    ctx: &CrawlContext,
) -> usize {
    let mut roots = Vec::new();
    collect_roots(tree, &mut roots);

    let total = roots.len();
    let mut crawled = 0;
    for (i, (url, depth)) in roots.into_iter().enumerate() {
        if ctx.cancel_handle().is_cancelled() {
            info!("Crawl cancelled after {} of {} root(s)", i, total);
            break;
        }

        let depth = depth.max(MIN_ROOT_DEPTH);
        info!("Crawling from root {} ({} of {}), depth {}", url, i + 1, total, depth);
        if refresh_node(crawler, tree, &url, depth, ctx).await {
            crawled += 1;
        }
        if let Some(node) = find_page_mut(tree, &url) {
            node.is_root = false;
        }
    }

    // Each root crawl dedups its own matches; roots can share pages
    ctx.dedup_matches().await;
    crawled
}

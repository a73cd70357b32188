use crate::model::{MergeKey, TreeNode};
use std::collections::HashMap;

/// Reconcile a fresh crawl with an existing, possibly hand-edited, forest.
///
/// Nodes are matched by [`MergeKey`] (the URL for pages). Existing nodes
/// keep their own fields and position; their children are merged with the
/// same rules and `is_crawled` becomes the OR of both sides. Nodes only in
/// `current` are kept; nodes only in `crawled` are appended in crawl order.
/// Applying the same crawl twice changes nothing the second time.
pub fn merge_trees(current: Vec<TreeNode>, crawled: Vec<TreeNode>) -> Vec<TreeNode> {
    let mut merged: Vec<TreeNode> = Vec::with_capacity(current.len() + crawled.len());
    let mut index: HashMap<MergeKey, usize> = HashMap::new();

    // Duplicate keys already in `current` fold into their first occurrence
    for node in current.into_iter().chain(crawled) {
        let key = node.merge_key();
        match index.get(&key) {
            Some(&i) => absorb(&mut merged[i], node),
            None => {
                index.insert(key, merged.len());
                merged.push(node);
            }
        }
    }

    merged
}

fn absorb(existing: &mut TreeNode, incoming: TreeNode) {
    match (existing, incoming) {
        (TreeNode::Page(kept), TreeNode::Page(fresh)) => {
            let children = std::mem::take(&mut kept.children);
            kept.children = merge_trees(children, fresh.children);
            kept.is_crawled |= fresh.is_crawled;
        }
        (TreeNode::Container(kept), TreeNode::Container(fresh)) => {
            let children = std::mem::take(&mut kept.children);
            kept.children = merge_trees(children, fresh.children);
        }
        // Overflow markers keep the existing count
        _ => {}
    }
}

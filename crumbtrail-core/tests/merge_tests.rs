// Tests for merging a crawl into an existing forest

use crumbtrail_core::merge::merge_trees;
use crumbtrail_core::model::{ContainerNode, PageNode, TreeNode, find_page};

fn url(name: &str) -> String {
    format!("https://site.test/{}.html", name)
}

fn node(label: &str, name: &str, crawled: bool, children: Vec<TreeNode>) -> TreeNode {
    TreeNode::Page(PageNode {
        label: label.to_string(),
        url: url(name),
        is_crawled: crawled,
        not_orphan: true,
        children,
        ..Default::default()
    })
}

fn labels(nodes: &[TreeNode]) -> Vec<String> {
    nodes.iter().map(TreeNode::label).collect()
}

// ============================================================================
// Matching and field preservation
// ============================================================================

#[test]
fn test_existing_label_survives_merge() {
    let current = vec![node("My renamed page", "a", false, vec![])];
    let crawled = vec![node("A", "a", true, vec![])];

    let merged = merge_trees(current, crawled);

    assert_eq!(merged.len(), 1);
    let a = merged[0].as_page().unwrap();
    assert_eq!(a.label, "My renamed page");
    assert!(a.is_crawled);
}

#[test]
fn test_is_crawled_never_reverts() {
    let current = vec![node("A", "a", true, vec![])];
    let crawled = vec![node("A", "a", false, vec![])];

    let merged = merge_trees(current, crawled);

    assert!(merged[0].as_page().unwrap().is_crawled);
}

#[test]
fn test_current_only_nodes_are_kept_in_place() {
    let current = vec![
        node("Hand added", "manual", false, vec![]),
        node("A", "a", false, vec![node("Old child", "old", false, vec![])]),
    ];
    let crawled = vec![node("A", "a", true, vec![node("B", "b", false, vec![])])];

    let merged = merge_trees(current, crawled);

    assert_eq!(labels(&merged), vec!["Hand added", "A"]);
    assert_eq!(labels(merged[1].children()), vec!["Old child", "B"]);
}

#[test]
fn test_crawled_only_nodes_append_in_crawl_order() {
    let current = vec![node("A", "a", false, vec![])];
    let crawled = vec![
        node("C", "c", false, vec![]),
        node("A", "a", true, vec![]),
        node("B", "b", false, vec![]),
    ];

    let merged = merge_trees(current, crawled);

    assert_eq!(labels(&merged), vec!["A", "C", "B"]);
}

#[test]
fn test_duplicate_urls_fold_into_first() {
    let current = vec![
        node("First", "a", false, vec![node("X", "x", false, vec![])]),
        node("Second", "a", true, vec![node("Y", "y", false, vec![])]),
    ];

    let merged = merge_trees(current, vec![]);

    assert_eq!(merged.len(), 1);
    let a = merged[0].as_page().unwrap();
    assert_eq!(a.label, "First");
    assert!(a.is_crawled);
    assert_eq!(labels(&a.children), vec!["X", "Y"]);
}

// ============================================================================
// Containers and overflow markers
// ============================================================================

#[test]
fn test_containers_match_by_label() {
    let current = vec![TreeNode::Container(ContainerNode {
        label: "Template change".into(),
        children: vec![node("A", "a", false, vec![])],
    })];
    let crawled = vec![TreeNode::Container(ContainerNode {
        label: "Template change".into(),
        children: vec![node("A", "a", true, vec![]), node("B", "b", false, vec![])],
    })];

    let merged = merge_trees(current, crawled);

    assert_eq!(merged.len(), 1);
    assert_eq!(labels(merged[0].children()), vec!["A", "B"]);
    assert!(merged[0].children()[0].is_crawled());
}

#[test]
fn test_overflow_keeps_existing_count() {
    let current = vec![node(
        "Forms",
        "forms",
        true,
        vec![TreeNode::Overflow {
            parent_url: url("forms"),
            hidden: 10,
        }],
    )];
    let crawled = vec![node(
        "Forms",
        "forms",
        true,
        vec![TreeNode::Overflow {
            parent_url: url("forms"),
            hidden: 12,
        }],
    )];

    let merged = merge_trees(current, crawled);

    assert_eq!(
        merged[0].children(),
        &[TreeNode::Overflow {
            parent_url: url("forms"),
            hidden: 10
        }]
    );
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_merge_is_idempotent() {
    let current = vec![node(
        "Root",
        "root",
        false,
        vec![node("Kept", "kept", false, vec![])],
    )];
    let crawled = vec![node(
        "Root",
        "root",
        true,
        vec![
            node("Kept", "kept", true, vec![node("Deep", "deep", false, vec![])]),
            node("New", "new", false, vec![]),
        ],
    )];

    let once = merge_trees(current, crawled.clone());
    let twice = merge_trees(once.clone(), crawled);

    assert_eq!(once, twice);
    assert!(find_page(&twice, &url("deep")).is_some());
    assert!(find_page(&twice, &url("kept")).unwrap().is_crawled);
}

#[test]
fn test_merge_with_empty_crawl_is_identity() {
    let current = vec![
        node("A", "a", true, vec![node("B", "b", false, vec![])]),
        node("C", "c", false, vec![]),
    ];

    assert_eq!(merge_trees(current.clone(), vec![]), current);
}

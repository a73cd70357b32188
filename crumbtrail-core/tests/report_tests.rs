// Tests for report generation and tree snapshots

use crumbtrail_core::model::{
    BreadcrumbNode, BrokenLink, HopStatus, PageNode, SearchMatch, TreeNode,
};
use crumbtrail_core::report::{
    IaReport, ReportFormat, count_pages, load_tree_snapshot, render_chain, render_text,
    save_report, save_tree_snapshot,
};
use tempfile::TempDir;

fn url(name: &str) -> String {
    format!("https://site.test/{}.html", name)
}

fn sample_tree() -> Vec<TreeNode> {
    vec![TreeNode::Page(PageNode {
        label: "Benefits".into(),
        url: url("benefits"),
        is_crawled: true,
        is_user_added: true,
        not_orphan: true,
        children: vec![
            TreeNode::Page(PageNode {
                label: "Child benefit".into(),
                url: url("child"),
                original_parent_url: Some(url("benefits")),
                not_orphan: true,
                ..Default::default()
            }),
            TreeNode::Overflow {
                parent_url: url("benefits"),
                hidden: 4,
            },
        ],
        ..Default::default()
    })]
}

fn sample_report() -> IaReport {
    IaReport::new(
        sample_tree(),
        vec![BrokenLink {
            parent_url: Some(url("benefits")),
            url: url("gone"),
            status: 404,
        }],
        vec![SearchMatch {
            url: url("child"),
            h1: "Child benefit".into(),
        }],
    )
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("txt"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("Text"), Some(ReportFormat::Text));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert_eq!(ReportFormat::from_str("csv"), None);
    assert_eq!(ReportFormat::from_str(""), None);
}

// ============================================================================
// Text Rendering Tests
// ============================================================================

#[test]
fn test_count_pages_skips_overflow() {
    assert_eq!(count_pages(&sample_tree()), 2);
}

#[test]
fn test_render_text_summary_and_sections() {
    let text = render_text(&sample_report());

    assert!(text.contains("Pages mapped: 2"));
    assert!(text.contains("Broken links: 1"));
    assert!(text.contains("Search matches: 1"));
    assert!(text.contains("✓ Benefits ★  https://site.test/benefits.html"));
    assert!(text.contains("○ Child benefit  https://site.test/child.html"));
    assert!(text.contains("⋯ + 4 more..."));
    assert!(text.contains("404 https://site.test/gone.html (from https://site.test/benefits.html)"));
    assert!(!text.contains("Warning"));
}

#[test]
fn test_render_text_warns_on_breaks() {
    let mut report = sample_report();
    report.has_break_after_root = true;

    let text = render_text(&report);

    assert!(text.contains("Warning: breadcrumb break after a root"));
    assert!(!text.contains("before a root"));
}

#[test]
fn test_render_chain_marks_hops_and_roots() {
    let mut root = BreadcrumbNode::new("Taxes", url("taxes"));
    root.is_root = true;
    root.status = HopStatus::Valid;
    let mut orphan = BreadcrumbNode::new("Forms", url("forms"));
    orphan.status = HopStatus::Orphan;
    let chain = vec![BreadcrumbNode::new("Home", url("home")), root, orphan];

    assert_eq!(render_chain(&chain), "Home → [Taxes] ✗ Forms");
}

// ============================================================================
// Snapshot Tests
// ============================================================================

#[test]
fn test_json_report_loads_as_tree_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");

    save_report(&sample_report(), ReportFormat::Json, &path).unwrap();
    let tree = load_tree_snapshot(&path).unwrap();

    assert_eq!(tree, sample_tree());
}

#[test]
fn test_bare_forest_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.json");

    save_tree_snapshot(&sample_tree(), &path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains(r#""kind": "overflow""#));

    assert_eq!(load_tree_snapshot(&path).unwrap(), sample_tree());
}

#[test]
fn test_load_snapshot_errors() {
    let dir = TempDir::new().unwrap();
    assert!(load_tree_snapshot(&dir.path().join("missing.json")).is_err());

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "not json").unwrap();
    assert!(load_tree_snapshot(&garbage).is_err());
}

#[test]
fn test_text_report_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.txt");

    save_report(&sample_report(), ReportFormat::Text, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("## Information architecture"));
}

// Tests for root detection

use crumbtrail_core::model::{BreadcrumbNode, PageRecord};
use crumbtrail_core::roots::{MIN_ROOT_DEPTH, resolve_roots};

fn url(name: &str) -> String {
    format!("https://site.test/{}.html", name)
}

fn record(name: &str, trail: &[&str]) -> PageRecord {
    let breadcrumb = trail
        .iter()
        .map(|c| BreadcrumbNode::new(*c, url(c)))
        .collect();
    PageRecord::new(url(name), name.to_uppercase(), breadcrumb)
}

fn root_urls(roots: &[PageRecord]) -> Vec<String> {
    roots.iter().map(|r| r.url.clone()).collect()
}

#[test]
fn test_root_is_page_no_one_claims() {
    let pages = vec![
        record("r", &["home"]),
        record("c1", &["home", "r"]),
        record("g", &["home", "r", "c1"]),
    ];

    let roots = resolve_roots(&pages);

    assert_eq!(root_urls(&roots), vec![url("r")]);
    assert_eq!(roots[0].descendants, vec![url("c1"), url("g")]);
}

#[test]
fn test_min_depth_reaches_furthest_descendant() {
    let pages = vec![
        record("r", &["home"]),
        record("c1", &["home", "r"]),
        record("g", &["home", "r", "c1"]),
        record("gg", &["home", "r", "c1", "g"]),
    ];

    let roots = resolve_roots(&pages);

    // r -> c1 -> g -> gg is four levels including the root
    assert_eq!(roots[0].min_depth, 4);
}

#[test]
fn test_min_depth_is_at_least_two() {
    let pages = vec![record("lonely", &["home"]), record("other", &[])];

    let roots = resolve_roots(&pages);

    assert_eq!(roots.len(), 2);
    assert!(roots.iter().all(|r| r.min_depth == MIN_ROOT_DEPTH));
    assert!(roots.iter().all(|r| r.descendants.is_empty()));
}

#[test]
fn test_self_reference_is_ignored() {
    let pages = vec![record("p", &["home", "p"])];

    let roots = resolve_roots(&pages);

    assert_eq!(root_urls(&roots), vec![url("p")]);
    assert!(roots[0].descendants.is_empty());
}

#[test]
fn test_two_page_cycle_has_no_root() {
    let pages = vec![record("a", &["b"]), record("b", &["a"])];

    let roots = resolve_roots(&pages);

    assert!(roots.is_empty());
}

#[test]
fn test_resolve_is_idempotent() {
    let pages = vec![
        record("r", &["home"]),
        record("c1", &["home", "r"]),
        record("s", &["home"]),
    ];

    let first = resolve_roots(&pages);
    let second = resolve_roots(&pages);
    assert_eq!(first, second);

    // Stale descendants on the input do not leak into the result
    let mut stale = pages.clone();
    stale[2].descendants.push(url("c1"));
    stale[2].min_depth = 9;
    assert_eq!(resolve_roots(&stale), first);
}

#[test]
fn test_every_root_depth_covers_its_descendants() {
    let pages = vec![
        record("r", &["home"]),
        record("a", &["home", "r"]),
        record("b", &["home", "r", "a"]),
        record("q", &["home"]),
        record("z", &["q"]),
    ];

    for root in resolve_roots(&pages) {
        assert!(root.min_depth >= MIN_ROOT_DEPTH);
        for child in &root.descendants {
            let page = pages.iter().find(|p| &p.url == child).unwrap();
            let position = page
                .breadcrumb
                .iter()
                .position(|c| c.url == root.url)
                .unwrap();
            assert!(root.min_depth >= page.breadcrumb.len() + 1 - position);
        }
    }
}

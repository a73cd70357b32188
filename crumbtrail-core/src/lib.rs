pub mod breadcrumbs;
pub mod context;
pub mod error;
pub mod merge;
pub mod model;
pub mod progress;
pub mod records;
pub mod report;
pub mod roots;
pub mod scaffold;
pub mod search;
pub mod tree;

pub use breadcrumbs::{BreadcrumbValidator, Classification, classify};
pub use context::{CancelHandle, CrawlContext};
pub use error::CoreError;
pub use merge::merge_trees;
pub use model::{
    BreadcrumbChain, BreadcrumbNode, BrokenLink, ContainerNode, Highlight, HopStatus, PageNode,
    PageRecord, SearchMatch, TreeNode,
};
pub use progress::{ProgressCallback, ProgressSnapshot};
pub use records::{SeedUrl, collect_page_records};
pub use roots::resolve_roots;
pub use scaffold::{build_context_tree, crawl_from_roots, refresh_node};
pub use search::SearchTerms;
pub use tree::{FanOutPolicy, TreeCrawler};

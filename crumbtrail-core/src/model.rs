use serde::{Deserialize, Serialize};

/// A seed page together with its breadcrumb, as classified by the root pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub h1: String,
    pub breadcrumb: Vec<BreadcrumbNode>,
    /// Known pages whose breadcrumb lists this one. Filled in by root resolution.
    pub descendants: Vec<String>,
    /// Smallest crawl depth reaching every known descendant. Filled in by root resolution.
    pub min_depth: usize,
    pub prototype_url: Option<String>,
}

impl PageRecord {
    pub fn new(url: impl Into<String>, h1: impl Into<String>, breadcrumb: Vec<BreadcrumbNode>) -> Self {
        Self {
            url: url.into(),
            h1: h1.into(),
            breadcrumb,
            descendants: Vec::new(),
            min_depth: 0,
            prototype_url: None,
        }
    }
}

/// Outcome of checking that a breadcrumb parent links to its child.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum HopStatus {
    #[default]
    Pending,
    Valid,
    /// Parent fetched fine but does not link to the child
    Orphan,
    /// Parent or child has no usable URL in the breadcrumb
    MissingLink,
    /// Parent could not be fetched
    FetchError(String),
}

impl HopStatus {
    /// Tri-state validity: `None` until validated.
    pub fn valid(&self) -> Option<bool> {
        match self {
            HopStatus::Pending => None,
            HopStatus::Valid => Some(true),
            _ => Some(false),
        }
    }

    /// Orphans and errors both break reachability.
    pub fn is_break(&self) -> bool {
        matches!(
            self,
            HopStatus::Orphan | HopStatus::MissingLink | HopStatus::FetchError(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    #[default]
    Pending,
    /// First entry of a breadcrumb trail
    BreadcrumbRoot,
    /// Before the crawl root: shown for context, never crawled
    Context,
    CrawlRoot,
    Valid,
    Orphan,
    Error,
    DescendantOfOrphan,
}

/// One entry of a breadcrumb trail, or the synthetic entry for the page itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BreadcrumbNode {
    pub label: String,
    pub url: String,
    pub is_root: bool,
    pub is_descendant: bool,
    pub status: HopStatus,
    pub highlight: Highlight,
    /// User-supplied page, rendered in bold
    pub emphasized: bool,
    pub prototype_url: Option<String>,
}

impl BreadcrumbNode {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn valid(&self) -> Option<bool> {
        self.status.valid()
    }

    pub fn tooltip(&self) -> String {
        let base = match (&self.highlight, &self.status) {
            (Highlight::CrawlRoot, _) => "Starting point for IA crawl",
            (Highlight::Context, _) => {
                "Page will be shown in IA map for context but no links will be crawled"
            }
            (Highlight::BreadcrumbRoot, _) => "Breadcrumb root",
            (Highlight::DescendantOfOrphan, _) => "Descendant of IA orphan",
            (_, HopStatus::Pending) => "Validation pending",
            (_, HopStatus::Valid) => "Valid child page",
            (_, HopStatus::Orphan) => "IA orphan: no link from parent",
            (_, HopStatus::MissingLink) => "Link missing from breadcrumb",
            (_, HopStatus::FetchError(_)) => "Error validating link",
        };
        if self.emphasized {
            format!("{} (user-added page)", base)
        } else {
            base.to_string()
        }
    }
}

/// A breadcrumb trail plus the synthetic node for the page that owns it.
pub type BreadcrumbChain = Vec<BreadcrumbNode>;

/// A real page in the IA forest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageNode {
    pub label: String,
    pub url: String,
    pub original_parent_url: Option<String>,
    pub is_root: bool,
    pub is_crawled: bool,
    pub crawl_depth: usize,
    pub is_user_added: bool,
    pub not_orphan: bool,
    /// Ancestor shown for context only
    pub context_only: bool,
    pub prototype_url: Option<String>,
    pub children: Vec<TreeNode>,
}

/// Grouping node without a page of its own, used to mark template changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Page(PageNode),
    Container(ContainerNode),
    /// Stand-in for child links skipped by the fan-out cap
    Overflow { parent_url: String, hidden: usize },
}

/// Identity used when reconciling two lists of siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeKey {
    Page(String),
    Container(String),
    Overflow(String),
}

impl TreeNode {
    pub fn label(&self) -> String {
        match self {
            TreeNode::Page(p) => p.label.clone(),
            TreeNode::Container(c) => c.label.clone(),
            TreeNode::Overflow { hidden, .. } => format!("+ {} more...", hidden),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            TreeNode::Page(p) => Some(&p.url),
            _ => None,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Page(p) => &p.children,
            TreeNode::Container(c) => &c.children,
            TreeNode::Overflow { .. } => &[],
        }
    }

    pub fn is_crawled(&self) -> bool {
        match self {
            TreeNode::Page(p) => p.is_crawled,
            TreeNode::Container(_) => false,
            TreeNode::Overflow { .. } => true,
        }
    }

    pub fn as_page(&self) -> Option<&PageNode> {
        match self {
            TreeNode::Page(p) => Some(p),
            _ => None,
        }
    }

    pub fn merge_key(&self) -> MergeKey {
        match self {
            TreeNode::Page(p) => MergeKey::Page(p.url.clone()),
            TreeNode::Container(c) => MergeKey::Container(c.label.clone()),
            TreeNode::Overflow { parent_url, .. } => MergeKey::Overflow(parent_url.clone()),
        }
    }
}

/// Depth-first search for the page node with `url`.
pub fn find_page<'a>(nodes: &'a [TreeNode], url: &str) -> Option<&'a PageNode> {
    for node in nodes {
        if let TreeNode::Page(p) = node
            && p.url == url
        {
            return Some(p);
        }
        if let Some(found) = find_page(node.children(), url) {
            return Some(found);
        }
    }
    None
}

pub fn find_page_mut<'a>(nodes: &'a mut [TreeNode], url: &str) -> Option<&'a mut PageNode> {
    for node in nodes.iter_mut() {
        if matches!(node, TreeNode::Page(p) if p.url == url) {
            if let TreeNode::Page(p) = node {
                return Some(p);
            }
        }
        let children = match node {
            TreeNode::Page(p) => &mut p.children,
            TreeNode::Container(c) => &mut c.children,
            TreeNode::Overflow { .. } => continue,
        };
        if let Some(found) = find_page_mut(children, url) {
            return Some(found);
        }
    }
    None
}

/// A page that failed to load during a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    pub parent_url: Option<String>,
    pub url: String,
    pub status: u16,
}

/// A crawled page whose text matched one of the search terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub url: String,
    pub h1: String,
}

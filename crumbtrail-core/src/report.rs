// Report generation from a finished IA run

use crate::breadcrumbs::Classification;
use crate::error::Result;
use crate::model::{BreadcrumbChain, BrokenLink, HopStatus, SearchMatch, TreeNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IaReport {
    pub generated_at: DateTime<Utc>,
    pub tree: Vec<TreeNode>,
    pub broken_links: Vec<BrokenLink>,
    pub search_matches: Vec<SearchMatch>,
    pub has_break_before_root: bool,
    pub has_break_after_root: bool,
}

impl IaReport {
    pub fn new(tree: Vec<TreeNode>, broken_links: Vec<BrokenLink>, search_matches: Vec<SearchMatch>) -> Self {
        Self {
            generated_at: Utc::now(),
            tree,
            broken_links,
            search_matches,
            has_break_before_root: false,
            has_break_after_root: false,
        }
    }

    pub fn with_classification(mut self, classification: &Classification) -> Self {
        self.has_break_before_root = classification.has_break_before_root;
        self.has_break_after_root = classification.has_break_after_root;
        self
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(render_text(self)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

fn node_marker(node: &TreeNode) -> &'static str {
    match node {
        TreeNode::Page(p) if !p.not_orphan => "✗",
        TreeNode::Page(p) if p.context_only => "·",
        TreeNode::Page(p) if p.is_crawled => "✓",
        TreeNode::Page(_) => "○",
        TreeNode::Container(_) => "▸",
        TreeNode::Overflow { .. } => "⋯",
    }
}

fn render_nodes(nodes: &[TreeNode], depth: usize, out: &mut String) {
    for node in nodes {
        let indent = "  ".repeat(depth + 1);
        match node {
            TreeNode::Page(page) => {
                let user = if page.is_user_added { " ★" } else { "" };
                out.push_str(&format!(
                    "{}{} {}{}  {}\n",
                    indent,
                    node_marker(node),
                    page.label,
                    user,
                    page.url
                ));
            }
            _ => out.push_str(&format!("{}{} {}\n", indent, node_marker(node), node.label())),
        }
        render_nodes(node.children(), depth + 1, out);
    }
}

/// Count every page node in the forest.
pub fn count_pages(nodes: &[TreeNode]) -> usize {
    nodes
        .iter()
        .map(|n| usize::from(n.as_page().is_some()) + count_pages(n.children()))
        .sum()
}

pub fn render_text(report: &IaReport) -> String {
    let mut out = String::new();
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    out.push_str("# Summary:\n");
    out.push_str(&format!("  Pages mapped: {}\n", count_pages(&report.tree)));
    out.push_str(&format!("  Broken links: {}\n", report.broken_links.len()));
    out.push_str(&format!("  Search matches: {}\n", report.search_matches.len()));
    if report.has_break_before_root {
        out.push_str("  Warning: breadcrumb break before a root\n");
    }
    if report.has_break_after_root {
        out.push_str("  Warning: breadcrumb break after a root\n");
    }
    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    out.push_str("## Information architecture\n");
    render_nodes(&report.tree, 0, &mut out);

    if !report.broken_links.is_empty() {
        out.push_str("\n## Broken links\n");
        for link in &report.broken_links {
            let parent = link
                .parent_url
                .as_deref()
                .map(|p| format!(" (from {})", p))
                .unwrap_or_default();
            out.push_str(&format!("  {} {}{}\n", link.status, link.url, parent));
        }
    }

    if !report.search_matches.is_empty() {
        out.push_str("\n## Search matches\n");
        for found in &report.search_matches {
            out.push_str(&format!("  {}  {}\n", found.h1, found.url));
        }
    }

    out
}

/// Short marker for a breadcrumb hop.
pub fn hop_marker(status: &HopStatus) -> &'static str {
    match status {
        HopStatus::Pending => "?",
        HopStatus::Valid => "→",
        HopStatus::Orphan => "✗",
        HopStatus::MissingLink | HopStatus::FetchError(_) => "!",
    }
}

/// One line per chain: `A → B ✗ C`, roots in brackets.
pub fn render_chain(chain: &BreadcrumbChain) -> String {
    let mut line = String::new();
    for (i, crumb) in chain.iter().enumerate() {
        if i > 0 {
            line.push_str(&format!(" {} ", hop_marker(&crumb.status)));
        }
        if crumb.is_root {
            line.push_str(&format!("[{}]", crumb.label));
        } else {
            line.push_str(&crumb.label);
        }
    }
    line
}

pub fn save_report(report: &IaReport, format: ReportFormat, path: &Path) -> Result<()> {
    fs::write(path, report.render(format)?)?;
    Ok(())
}

/// Read a tree back from a JSON report or a bare JSON forest.
pub fn load_tree_snapshot(path: &Path) -> Result<Vec<TreeNode>> {
    let content = fs::read_to_string(path)?;
    if let Ok(report) = serde_json::from_str::<IaReport>(&content) {
        return Ok(report.tree);
    }
    Ok(serde_json::from_str(&content)?)
}

pub fn save_tree_snapshot(tree: &[TreeNode], path: &Path) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(tree)?)?;
    Ok(())
}

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// One `<a>` inside the page's breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    pub label: String,
    /// Absolute URL, or empty when the href could not be resolved.
    pub url: String,
}

/// Everything the IA passes read from a single page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub h1: String,
    pub breadcrumb: Vec<Crumb>,
    /// Same-origin links inside `<main>`, fragment stripped, self excluded.
    pub main_links: Vec<String>,
    /// Every link on the page, fragment stripped.
    pub all_links: Vec<String>,
    /// Lowercased text content of `<body>`.
    pub body_text: String,
}

impl PageMeta {
    pub fn parse(html: &str, page_url: &str) -> Self {
        let document = Html::parse_document(html);

        let h1_selector = Selector::parse("h1").unwrap();
        let h1 = document
            .select(&h1_selector)
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" / ");

        let crumb_selector = Selector::parse(".breadcrumb li a").unwrap();
        let breadcrumb = document
            .select(&crumb_selector)
            .map(|a| {
                let href = a.value().attr("href").unwrap_or("");
                let url = join_url(page_url, href).unwrap_or_else(|| {
                    debug!("Invalid breadcrumb href: {}", href);
                    String::new()
                });
                Crumb {
                    label: a.text().collect::<String>().trim().to_string(),
                    url,
                }
            })
            .collect();

        let main_selector = Selector::parse("main a[href]").unwrap();
        let this_page = strip_fragment(page_url);
        let origin = Url::parse(page_url).ok().map(|u| u.origin());
        let mut seen = HashSet::new();
        let mut main_links = Vec::new();
        for a in document.select(&main_selector) {
            let Some(link) = a.value().attr("href").and_then(|h| resolve_url(page_url, h)) else {
                continue;
            };
            let same_origin = match (&origin, Url::parse(&link)) {
                (Some(origin), Ok(parsed)) => parsed.origin() == *origin,
                _ => false,
            };
            if same_origin && Some(&link) != this_page.as_ref() && seen.insert(link.clone()) {
                main_links.push(link);
            }
        }

        let link_selector = Selector::parse("a[href]").unwrap();
        let all_links = document
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve_url(page_url, href))
            .collect();

        let body_selector = Selector::parse("body").unwrap();
        let body_text = document
            .select(&body_selector)
            .next()
            .map(|b| b.text().collect::<String>().to_lowercase())
            .unwrap_or_default();

        Self {
            h1,
            breadcrumb,
            main_links,
            all_links,
            body_text,
        }
    }

    /// URL of the closest ancestor listed in the breadcrumb.
    pub fn breadcrumb_parent(&self) -> Option<&str> {
        self.breadcrumb.last().map(|c| c.url.as_str())
    }
}

/// Resolve `href` against `base` and drop the fragment. Non-navigational
/// hrefs (javascript:, mailto:, tel:, bare fragments) yield `None`.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut url = Url::parse(base).ok()?.join(href).ok()?;
    url.set_fragment(None);
    Some(url.to_string())
}

/// Resolve without any filtering, keeping the fragment. Used for breadcrumb
/// entries, which must match page URLs exactly.
fn join_url(base: &str, href: &str) -> Option<String> {
    Url::parse(base).ok()?.join(href.trim()).ok().map(|u| u.to_string())
}

fn strip_fragment(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html><body>
        <nav><ol class="breadcrumb">
            <li><a href="/en.html">Canada.ca</a></li>
            <li><a href="/en/services/taxes.html"> Taxes </a></li>
        </ol></nav>
        <h1>Income tax</h1>
        <main>
            <a href="/en/services/taxes/income-tax/personal.html">Personal</a>
            <a href="/en/services/taxes/income-tax/personal.html#top">Personal again</a>
            <a href="https://other.example.org/page.html">Elsewhere</a>
            <a href="#main">Skip</a>
            <a href="mailto:someone@example.com">Mail</a>
            <a href="/en/services/taxes/income-tax.html">Self</a>
        </main>
        <footer><a href="/en/contact.html">Contact</a></footer>
    </body></html>"##;

    const URL: &str = "https://www.canada.ca/en/services/taxes/income-tax.html";

    #[test]
    fn test_parse_h1_and_breadcrumb() {
        let meta = PageMeta::parse(PAGE, URL);
        assert_eq!(meta.h1, "Income tax");
        assert_eq!(meta.breadcrumb.len(), 2);
        assert_eq!(meta.breadcrumb[0].url, "https://www.canada.ca/en.html");
        assert_eq!(meta.breadcrumb[1].label, "Taxes");
        assert_eq!(
            meta.breadcrumb_parent(),
            Some("https://www.canada.ca/en/services/taxes.html")
        );
    }

    #[test]
    fn test_main_links_are_same_origin_unique_and_exclude_self() {
        let meta = PageMeta::parse(PAGE, URL);
        assert_eq!(
            meta.main_links,
            vec!["https://www.canada.ca/en/services/taxes/income-tax/personal.html".to_string()]
        );
    }

    #[test]
    fn test_all_links_include_chrome() {
        let meta = PageMeta::parse(PAGE, URL);
        assert!(meta.all_links.contains(&"https://www.canada.ca/en/contact.html".to_string()));
        assert!(meta.all_links.contains(&"https://other.example.org/page.html".to_string()));
    }

    #[test]
    fn test_multiple_h1_are_joined() {
        let meta = PageMeta::parse("<h1>One</h1><h1> </h1><h1>Two</h1>", URL);
        assert_eq!(meta.h1, "One / Two");
    }

    #[test]
    fn test_body_text_is_lowercased() {
        let meta = PageMeta::parse("<body><p>Hello WORLD</p></body>", URL);
        assert!(meta.body_text.contains("hello world"));
    }

    #[test]
    fn test_resolve_url_skips_non_navigational() {
        assert_eq!(resolve_url(URL, "javascript:void(0)"), None);
        assert_eq!(resolve_url(URL, "tel:123"), None);
        assert_eq!(resolve_url(URL, ""), None);
        assert_eq!(
            resolve_url(URL, "other.html#x"),
            Some("https://www.canada.ca/en/services/taxes/other.html".to_string())
        );
    }
}

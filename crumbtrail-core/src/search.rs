use regex::{Regex, RegexBuilder};
use tracing::warn;

const REGEX_PREFIX: &str = "regex:";

#[derive(Debug, Clone)]
pub enum SearchTerm {
    /// Lowercased substring
    Text(String),
    Pattern(Regex),
}

impl SearchTerm {
    /// `text` must already be lowercased.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            SearchTerm::Text(term) => text.contains(term.as_str()),
            SearchTerm::Pattern(re) => re.is_match(text),
        }
    }

    fn source(&self) -> String {
        match self {
            SearchTerm::Text(term) => term.clone(),
            SearchTerm::Pattern(re) => format!("{}{}", REGEX_PREFIX, re.as_str()),
        }
    }
}

/// Full-text terms checked against every crawled page.
#[derive(Debug, Clone, Default)]
pub struct SearchTerms {
    terms: Vec<SearchTerm>,
}

impl SearchTerms {
    /// Parse user input: terms are separated by newlines, semicolons or
    /// tabs. `regex:<pattern>` compiles a case-insensitive, multi-line,
    /// dot-matches-newline pattern; anything else is a literal.
    pub fn parse(raw: &str) -> Self {
        let mut terms: Vec<SearchTerm> = Vec::new();
        for piece in raw.split(['\n', ';', '\t']) {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }

            let term = if let Some(pattern) = piece.strip_prefix(REGEX_PREFIX) {
                match RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .multi_line(true)
                    .dot_matches_new_line(true)
                    .build()
                {
                    Ok(re) => SearchTerm::Pattern(re),
                    Err(e) => {
                        warn!("Skipping invalid search pattern '{}': {}", pattern, e);
                        continue;
                    }
                }
            } else {
                SearchTerm::Text(piece.to_lowercase())
            };

            if !terms.iter().any(|t| t.source() == term.source()) {
                terms.push(term);
            }
        }
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[SearchTerm] {
        &self.terms
    }

    /// True if any term matches. `text` must already be lowercased.
    pub fn matches(&self, text: &str) -> bool {
        self.terms.iter().any(|t| t.is_match(text))
    }
}

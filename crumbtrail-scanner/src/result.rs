use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::page::PageMeta;

/// A successfully fetched HTML document.
///
/// Only the raw body is kept; parsing happens on demand through [`PageMeta`]
/// so no DOM is ever held across an await point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub response_time: Duration,
    pub body: String,
}

impl Document {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            content_type: Some("text/html".to_string()),
            response_time: Duration::from_secs(0),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body and pull out everything the IA passes need.
    pub fn page_meta(&self) -> PageMeta {
        PageMeta::parse(&self.body, &self.url)
    }
}

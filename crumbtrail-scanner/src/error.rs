use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Blocked host: {host} blocked for url {url}")]
    BlockedHost { host: String, url: String },

    #[error("Fetch failed with status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("No page registered for {0}")]
    NotFound(String),
}

impl ScanError {
    /// HTTP status behind the failure, or 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            ScanError::Status { status, .. } => *status,
            ScanError::HttpError(e) => e.status().map(|s| s.as_u16()).unwrap_or(0),
            _ => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

use crate::error::{Result, ScanError};
use crate::result::Document;
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Source of pages for every IA pass.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, returning the document or the terminal failure after
    /// any retries the implementation performs.
    async fn fetch(&self, url: &str) -> Result<Document>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, url: &str) -> Result<Document> {
        (**self).fetch(url).await
    }
}

/// Which allowlisted host group a request may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMode {
    /// Published site only
    #[default]
    Prod,
    /// Prototype hosting only
    Proto,
    /// Published site and prototypes
    Both,
    /// No host restriction
    None,
}

impl HostMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "prod" => Some(HostMode::Prod),
            "proto" => Some(HostMode::Proto),
            "both" => Some(HostMode::Both),
            "none" => Some(HostMode::None),
            _ => None,
        }
    }
}

/// Allowlist of trusted hosts. This is the only boundary that keeps the
/// crawler on the publishing platform, so redirects are checked too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostPolicy {
    pub prod_hosts: HashSet<String>,
    pub proto_hosts: HashSet<String>,
    pub require_https: bool,
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self {
            prod_hosts: HashSet::from(["www.canada.ca".to_string()]),
            proto_hosts: HashSet::from([
                "cra-design.github.io".to_string(),
                "test.canada.ca".to_string(),
            ]),
            require_https: true,
        }
    }
}

impl HostPolicy {
    /// Open policy for local servers and tests.
    pub fn permissive() -> Self {
        Self {
            prod_hosts: HashSet::new(),
            proto_hosts: HashSet::new(),
            require_https: false,
        }
    }

    pub fn allows_host(&self, host: &str, mode: HostMode) -> bool {
        match mode {
            HostMode::None => true,
            HostMode::Prod => self.prod_hosts.contains(host),
            HostMode::Proto => self.proto_hosts.contains(host),
            HostMode::Both => self.prod_hosts.contains(host) || self.proto_hosts.contains(host),
        }
    }

    fn allows_scheme(&self, scheme: &str) -> bool {
        match scheme {
            "https" => true,
            "http" => !self.require_https,
            _ => false,
        }
    }

    /// Whether a redirect target may be followed, by the same scheme and
    /// host rules as [`HostPolicy::validate`].
    pub fn allows_redirect(&self, target: &Url, mode: HostMode) -> bool {
        self.allows_scheme(target.scheme())
            && target.host_str().is_some_and(|host| self.allows_host(host, mode))
    }

    /// Validate `url` against the policy and return it normalised.
    pub fn validate(&self, url: &str, mode: HostMode) -> Result<Url> {
        let trimmed = url.trim();
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ScanError::InvalidUrl(trimmed.to_string()));
        }
        let parsed =
            Url::parse(trimmed).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

        if !self.allows_scheme(parsed.scheme()) {
            return Err(ScanError::InvalidUrl(trimmed.to_string()));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ScanError::InvalidUrl(trimmed.to_string()))?;
        if !self.allows_host(host, mode) {
            return Err(ScanError::BlockedHost {
                host: host.to_string(),
                url: trimmed.to_string(),
            });
        }

        Ok(parsed)
    }
}

/// Pause applied before every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delay {
    #[default]
    None,
    /// Fixed pause in milliseconds
    Fixed(u64),
    /// Random pause between 100 and 1600 ms
    Random,
}

impl Delay {
    fn duration(&self) -> Duration {
        match self {
            Delay::None => Duration::ZERO,
            Delay::Fixed(ms) => Duration::from_millis(*ms),
            Delay::Random => Duration::from_millis(rand::thread_rng().gen_range(100..1600)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, at least one is always made
    pub retries: u32,
    pub delay: Delay,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 5,
            delay: Delay::None,
        }
    }
}

const RETRY_PAUSE: Duration = Duration::from_millis(50);
const MAX_REDIRECTS: usize = 5;

/// reqwest-backed [`Fetcher`] with host allowlisting and retries.
pub struct HttpFetcher {
    client: Client,
    policy: Arc<HostPolicy>,
    host_mode: HostMode,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(policy: HostPolicy, host_mode: HostMode) -> Result<Self> {
        Self::with_timeout(policy, host_mode, 10)
    }

    pub fn with_timeout(policy: HostPolicy, host_mode: HostMode, timeout_secs: u64) -> Result<Self> {
        let policy = Arc::new(policy);
        let redirect_policy = policy.clone();

        let client = Client::builder()
            .user_agent("Crumbtrail/0.1 (https://github.com/trapdoorsec/crumbtrail)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(50) // Connection pooling
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::custom(move |attempt| {
                if attempt.previous().len() >= MAX_REDIRECTS {
                    return attempt.error("too many redirects");
                }
                if redirect_policy.allows_redirect(attempt.url(), host_mode) {
                    attempt.follow()
                } else {
                    // Hand the 3xx back to the caller, which treats it as a failure
                    attempt.stop()
                }
            }))
            .build()?;

        Ok(Self {
            client,
            policy,
            host_mode,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn host_mode(&self) -> HostMode {
        self.host_mode
    }

    async fn fetch_once(&self, url: &Url) -> Result<Document> {
        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        let response_time = start.elapsed();

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(Document {
            url: final_url,
            status,
            content_type,
            response_time,
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Document> {
        let parsed = self.policy.validate(url, self.host_mode)?;
        let attempts = self.retry.retries.max(1);

        let mut last_error = None;
        for attempt in 1..=attempts {
            let pause = self.retry.delay.duration();
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            debug!("Fetching {} (attempt {}/{})", parsed, attempt, attempts);
            match self.fetch_once(&parsed).await {
                Ok(mut document) => {
                    // Keep the requested URL so callers can match it against links
                    document.url = parsed.to_string();
                    return Ok(document);
                }
                Err(e) => {
                    warn!("Fetch attempt #{} for {} failed: {}", attempt, parsed, e);
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(RETRY_PAUSE).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ScanError::InvalidUrl(url.to_string())))
    }
}

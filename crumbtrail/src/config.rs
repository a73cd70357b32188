use anyhow::{Context, Result};
use crumbtrail_core::FanOutPolicy;
use crumbtrail_scanner::{HostMode, HostPolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/crumbtrail/config.json";

/// Settings read from the JSON config file. Every field is optional in the
/// file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hosts: HostPolicy,
    pub host_mode: HostMode,
    pub retry: RetryPolicy,
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub fan_out: FanOutPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hosts: HostPolicy::default(),
            host_mode: HostMode::default(),
            retry: RetryPolicy::default(),
            timeout_secs: 10,
            concurrency: 4,
            fan_out: FanOutPolicy::default(),
        }
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load settings from `path`, or from the default location when `path` is None.
///
/// A missing file at the default location is not an error; an explicitly
/// requested one is.
pub fn load_settings(path: Option<&str>) -> Result<Settings> {
    let explicit = path.is_some();
    let path = expand_path(path.unwrap_or(DEFAULT_CONFIG_PATH));

    if !path.exists() {
        if explicit {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        debug!("No config at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    read_settings(&path)
}

pub fn read_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let settings = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

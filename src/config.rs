//! Runtime configuration
//!
//! Settings come from `~/.fundwatch/config.toml` when present, otherwise
//! defaults. A couple of environment variables override the file so tests
//! and scripts can run without touching it.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const QUOTE_URL: &str = "https://fundgz.1234567.com.cn/js/{code}.js";
pub const HISTORY_URL: &str = "https://fund.eastmoney.com/f10/F10DataApi.aspx?type=lsjz&code={code}&page=1&sdate={start}&edate={end}&per={per}";
pub const DIVIDEND_URL: &str = "https://fund.eastmoney.com/f10/F10DataApi.aspx?type=FHFB&code={code}";
pub const PROFILE_URL: &str = "https://fundf10.eastmoney.com/jbgk_{code}.html";

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub quote_url: String,
    pub history_url: String,
    pub dividend_url: String,
    pub profile_url: String,
    /// Optional first-party service answering `/api/fund/dividend/{code}`
    /// and `/api/fundname/{code}`.
    pub service_url: Option<String>,
    pub quote_timeout_ms: u64,
    pub fallback_timeout_ms: u64,
    pub history_timeout_ms: u64,
    pub dividend_timeout_ms: u64,
    pub dividend_retries: u32,
    pub retry_delay_ms: u64,
    pub max_concurrency: usize,
    pub recent_dividend_days: i64,
    /// Fail every request immediately instead of touching the network.
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quote_url: QUOTE_URL.to_string(),
            history_url: HISTORY_URL.to_string(),
            dividend_url: DIVIDEND_URL.to_string(),
            profile_url: PROFILE_URL.to_string(),
            service_url: None,
            quote_timeout_ms: 3_000,
            fallback_timeout_ms: 5_000,
            history_timeout_ms: 10_000,
            dividend_timeout_ms: 15_000,
            dividend_retries: 3,
            retry_delay_ms: 1_000,
            max_concurrency: 6,
            recent_dividend_days: 45,
            offline: false,
        }
    }
}

impl Config {
    /// Load `~/.fundwatch/config.toml` (if any) and apply env overrides.
    pub fn load() -> Result<Self> {
        let path = crate::db::get_data_dir()?.join(CONFIG_FILENAME);
        let mut config = Self::from_file(&path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(raw)?;
        if config.max_concurrency == 0 {
            anyhow::bail!("max_concurrency must be at least 1");
        }
        config.service_url = config.service_url.as_deref().and_then(normalize_service_url);
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("FUNDWATCH_OFFLINE") {
            self.offline = v != "0";
        }
        if let Ok(url) = std::env::var("FUNDWATCH_SERVICE_URL") {
            self.service_url = normalize_service_url(&url);
        }
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_millis(self.quote_timeout_ms)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_timeout_ms)
    }

    pub fn history_timeout(&self) -> Duration {
        Duration::from_millis(self.history_timeout_ms)
    }

    pub fn dividend_timeout(&self) -> Duration {
        Duration::from_millis(self.dividend_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(crate::db::get_data_dir()?.join(CONFIG_FILENAME))
    }
}

/// Base URL without surrounding whitespace or trailing slashes; blank means unset.
fn normalize_service_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    (!url.is_empty()).then(|| url.to_string())
}

/// Fill `{name}` placeholders of an endpoint template.
pub fn render_url(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |url, (name, value)| {
        url.replace(&format!("{{{}}}", name), value)
    })
}

//! Configuration management for glasswall
//!
//! This module handles loading and validating configuration from environment variables,
//! TOML files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External directory crawl settings
    pub directory: DirectoryConfig,

    /// Social platform API settings
    pub platform: PlatformConfig,

    /// Serial mute executor settings
    pub executor: ExecutorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Directory crawler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Directory site base URL (page 1 is `{base_url}/`)
    pub base_url: String,

    /// Number of pages fetched concurrently per round
    pub concurrency: usize,

    /// Consecutive rounds without new handles before the crawl stops
    pub empty_round_threshold: u32,

    /// Pause between rounds in milliseconds
    pub round_delay_ms: u64,

    /// Per-page request timeout in milliseconds
    pub page_timeout_ms: u64,

    /// Optional hard cap on the number of pages requested
    pub max_pages: Option<u32>,

    /// Only accept links whose visible text starts with `@`
    pub require_at_label: bool,
}

/// Platform API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// REST API base URL (mute list and mute create live under it)
    pub api_base_url: String,

    /// Hosts whose single-segment paths are profile links
    pub profile_hosts: Vec<String>,

    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// User agent string
    pub user_agent: String,

    /// Pause between successful mute-list pages in milliseconds
    pub list_page_delay_ms: u64,

    /// Cooldown after a 429 while reading the mute list, in milliseconds
    pub list_rate_limit_cooldown_ms: u64,

    /// Maximum 429 retries while reading the mute list
    pub list_max_retries: u32,

    /// Abort the run instead of continuing with a partially read mute list
    pub abort_on_partial_list: bool,
}

/// Serial executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Lower bound of the per-entry delay window in milliseconds
    pub min_delay_ms: u64,

    /// Upper bound of the per-entry delay window in milliseconds
    pub max_delay_ms: u64,

    /// Cooldown after a 429 from the mute endpoint, in milliseconds
    pub rate_limit_cooldown_ms: u64,

    /// Emit a consolidated progress log every N successes
    pub log_every: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://basedinchina.com"),
            concurrency: 20,
            empty_round_threshold: 2,
            round_delay_ms: 500,
            page_timeout_ms: 8_000,
            max_pages: None,
            require_at_label: false,
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from("https://x.com/i/api/1.1"),
            profile_hosts: vec![
                String::from("x.com"),
                String::from("twitter.com"),
                String::from("mobile.twitter.com"),
                String::from("www.x.com"),
                String::from("www.twitter.com"),
            ],
            request_timeout_ms: 30_000,
            user_agent: format!("glasswall/{}", env!("CARGO_PKG_VERSION")),
            list_page_delay_ms: 200,
            list_rate_limit_cooldown_ms: 15_000,
            list_max_retries: 5,
            abort_on_partial_list: false,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 100,
            max_delay_ms: 500,
            rate_limit_cooldown_ms: 5_000,
            log_every: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Overlay `GLASSWALL_*` environment variables onto this configuration
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("GLASSWALL_DIRECTORY_URL") {
            self.directory.base_url = v;
        }
        if let Some(v) = env_parse("GLASSWALL_CONCURRENCY") {
            self.directory.concurrency = v;
        }
        if let Some(v) = env_parse("GLASSWALL_EMPTY_ROUNDS") {
            self.directory.empty_round_threshold = v;
        }
        if let Some(v) = env_parse("GLASSWALL_MAX_PAGES") {
            self.directory.max_pages = Some(v);
        }
        if let Ok(v) = std::env::var("GLASSWALL_API_URL") {
            self.platform.api_base_url = v;
        }
        if let Ok(v) = std::env::var("GLASSWALL_USER_AGENT") {
            self.platform.user_agent = v;
        }
        if let Some(v) = env_parse("GLASSWALL_LIST_MAX_RETRIES") {
            self.platform.list_max_retries = v;
        }
        if let Some(v) = env_parse("GLASSWALL_MIN_DELAY_MS") {
            self.executor.min_delay_ms = v;
        }
        if let Some(v) = env_parse("GLASSWALL_MAX_DELAY_MS") {
            self.executor.max_delay_ms = v;
        }
        if let Ok(v) = std::env::var("GLASSWALL_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("GLASSWALL_LOG_FORMAT") {
            self.logging.format = v;
        }
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.directory.concurrency == 0 {
            anyhow::bail!("directory.concurrency must be greater than 0");
        }

        if self.directory.empty_round_threshold == 0 {
            anyhow::bail!("directory.empty_round_threshold must be greater than 0");
        }

        if self.directory.base_url.trim().is_empty() {
            anyhow::bail!("directory.base_url must not be empty");
        }

        url::Url::parse(&self.directory.base_url)
            .with_context(|| format!("Invalid directory.base_url: {}", self.directory.base_url))?;

        url::Url::parse(&self.platform.api_base_url).with_context(|| {
            format!("Invalid platform.api_base_url: {}", self.platform.api_base_url)
        })?;

        if self.platform.profile_hosts.is_empty() {
            anyhow::bail!("platform.profile_hosts must list at least one host");
        }

        if self.executor.min_delay_ms > self.executor.max_delay_ms {
            anyhow::bail!(
                "executor.min_delay_ms ({}) must not exceed executor.max_delay_ms ({})",
                self.executor.min_delay_ms,
                self.executor.max_delay_ms
            );
        }

        if self.executor.log_every == 0 {
            anyhow::bail!("executor.log_every must be greater than 0");
        }

        Ok(())
    }

    /// Per-page directory timeout as Duration
    #[must_use]
    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.directory.page_timeout_ms)
    }

    /// Platform API timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.platform.request_timeout_ms)
    }
}

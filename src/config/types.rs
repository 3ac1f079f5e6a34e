use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for the crawler
///
/// Every section is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Backoff settings applied to every individual remote call
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per remote call
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base of the exponential wait (milliseconds)
    #[serde(rename = "multiplier-ms", default = "default_multiplier_ms")]
    pub multiplier_ms: u64,

    /// Lower bound of any single wait (milliseconds)
    #[serde(rename = "min-wait-ms", default = "default_min_wait_ms")]
    pub min_wait_ms: u64,

    /// Upper bound of any single wait (milliseconds)
    #[serde(rename = "max-wait-ms", default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            multiplier_ms: default_multiplier_ms(),
            min_wait_ms: default_min_wait_ms(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

/// Crawl scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of sources drained at the same time
    #[serde(rename = "max-concurrent-sources", default = "default_max_concurrent_sources")]
    pub max_concurrent_sources: usize,

    /// Items requested per enumeration page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sources: default_max_concurrent_sources(),
            page_size: default_page_size(),
        }
    }
}

/// Remote hub connection settings, passed through to the platform client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HubConfig {
    /// Base endpoint override (e.g. a mirror)
    pub endpoint: Option<String>,

    /// Access token
    pub token: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory under which fresh `{platform}_{date}` directories are created
    #[serde(default = "default_output_root")]
    pub root: PathBuf,

    /// Organization directory used to label accounts
    #[serde(rename = "orgs-path")]
    pub orgs_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
            orgs_path: None,
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_multiplier_ms() -> u64 {
    2_000
}

fn default_min_wait_ms() -> u64 {
    30_000
}

fn default_max_wait_ms() -> u64 {
    360_000
}

fn default_max_concurrent_sources() -> usize {
    1
}

fn default_page_size() -> u32 {
    100
}

fn default_output_root() -> PathBuf {
    PathBuf::from("data")
}

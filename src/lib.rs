//! OSLM crawler: popularity metadata for open-source models and datasets
//!
//! This crate enumerates models and datasets on hub platforms, fetches their
//! download, like and discussion counts, and writes the results as append-only
//! JSON lines. Failed items land in a separate error log that a later run can
//! resume from.

pub mod config;
pub mod crawler;
pub mod hub;
pub mod model;
pub mod orgs;
pub mod output;
pub mod target;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Hub error: {0}")]
    Hub(#[from] hub::HubError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid identifier '{0}': expected id:<repo>/<name>")]
    InvalidIdentifier(String),

    #[error("Invalid target '{target}': {message}")]
    InvalidTarget { target: String, message: String },

    #[error("Malformed record in {path} line {line}: {source}")]
    ResumeLog {
        path: String,
        line: usize,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Account '{account}' on {platform} is listed under both '{first}' and '{second}'")]
    DuplicateAccount {
        platform: model::Platform,
        account: String,
        first: String,
        second: String,
    },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, CrawlReport, FetchEngine, RetryPolicy};
pub use model::{Category, FetchResult, Platform, Source};
pub use orgs::{OrgDirectory, OrgInfo};
pub use target::{resolve_target, ResolvedTarget, SkipSet};

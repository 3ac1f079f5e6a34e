//! Crawler module for hub metadata
//!
//! This module contains the core crawling logic, including:
//! - Per-call retry with exponential backoff
//! - Lazy per-source fetch streams
//! - Overall crawl coordination
//!
//! [`run_crawl`] ties the pieces together: resolve the target, connect to the
//! platform, and drain every source into the output log pair.

mod coordinator;
mod fetcher;
mod retry;

pub use coordinator::Coordinator;
pub use fetcher::FetchEngine;
pub use retry::RetryPolicy;

pub use crate::output::CrawlReport;

use crate::config::Config;
use crate::hub::{self, HubApi, HubSettings};
use crate::model::today;
use crate::orgs::{load_org_directory, OrgDirectory};
use crate::target::{resolve_target, ResolveRequest, ResolvedTarget};
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Organization directory consulted when none is configured
pub const DEFAULT_ORGS_PATH: &str = "config/orgs.toml";

/// Loads the organization directory used to label accounts
///
/// Uses `output.orgs-path` when configured, otherwise [`DEFAULT_ORGS_PATH`]
/// if it exists, otherwise an empty directory.
pub fn load_default_orgs(config: &Config) -> Result<OrgDirectory> {
    if let Some(path) = &config.output.orgs_path {
        return Ok(load_org_directory(path)?);
    }

    let fallback = Path::new(DEFAULT_ORGS_PATH);
    if fallback.is_file() {
        return Ok(load_org_directory(fallback)?);
    }

    tracing::debug!("No organization directory, accounts stay unlabeled");
    Ok(OrgDirectory::default())
}

/// Resolves `request` into the sources and output directory of a run
///
/// Performs no network activity and creates no files.
pub fn plan_crawl(config: &Config, request: &ResolveRequest) -> Result<ResolvedTarget> {
    let orgs = load_default_orgs(config)?;
    resolve_target(request, &orgs, &config.output.root, &today())
}

/// Connection settings for the hub client
pub fn hub_settings(config: &Config) -> HubSettings {
    HubSettings {
        endpoint: config.hub.endpoint.clone(),
        token: config.hub.token.clone(),
        page_size: config.crawler.page_size,
    }
}

/// Executes an already resolved target
pub async fn execute(config: &Config, plan: &ResolvedTarget) -> Result<CrawlReport> {
    if plan.sources.is_empty() {
        tracing::info!("Nothing to crawl for {}", plan.output_dir.display());
        return Ok(CrawlReport::empty(
            plan.platform,
            plan.category,
            plan.output_dir.clone(),
        ));
    }

    let client: Arc<dyn HubApi> = Arc::from(hub::connect(plan.platform, &hub_settings(config))?);
    let engine = FetchEngine::new(client, RetryPolicy::from_config(&config.retry));
    let coordinator = Coordinator::new(engine, config.crawler.max_concurrent_sources);
    coordinator.run(plan).await
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the organization directory
/// 2. Resolve the target into sources and an output directory
/// 3. Connect to the platform
/// 4. Drain every source into the output log pair
///
/// # Example
///
/// ```no_run
/// use oslm_crawler::crawler::run_crawl;
/// use oslm_crawler::target::ResolveRequest;
/// use oslm_crawler::{Category, Config, Platform};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let request = ResolveRequest::new("deepseek-ai", Platform::Huggingface, Category::Model);
/// let report = run_crawl(&Config::default(), &request).await?;
/// println!("{} failures", report.failures);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, request: &ResolveRequest) -> Result<CrawlReport> {
    let plan = plan_crawl(config, request)?;
    execute(config, &plan).await
}

//! OSLM crawler main entry point
//!
//! This is the command-line interface for crawling hub popularity metadata.

use anyhow::Context;
use clap::Parser;
use oslm_crawler::config::{load_config_with_hash, validate, Config};
use oslm_crawler::crawler::{execute, plan_crawl};
use oslm_crawler::output::print_report;
use oslm_crawler::target::{split_list, ResolveRequest, ResolvedTarget, SkipSet};
use oslm_crawler::{Category, Platform};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// OSLM crawler: download, like and discussion counts for hub models and datasets
///
/// TARGET is one of:
/// - a previous output directory, to retry the items recorded in its error log
/// - an organization directory file (TOML), to crawl every listed account
/// - `id:<repo>/<name>`, to crawl a single item
/// - an account name, to crawl every item it publishes
#[derive(Parser, Debug)]
#[command(name = "oslm-crawler")]
#[command(version)]
#[command(about = "Crawl popularity metadata from model hubs", long_about = None)]
struct Cli {
    /// What to crawl
    #[arg(value_name = "TARGET")]
    target: String,

    /// Hub platform (huggingface, modelscope)
    #[arg(short, long, default_value = "huggingface")]
    platform: Platform,

    /// Item category (model, dataset)
    #[arg(short, long, default_value = "model")]
    category: Category,

    /// Only crawl these organizations (comma-separated)
    #[arg(long, value_name = "ORGS")]
    orgs: Option<String>,

    /// Skip entries: `org:<name>`, `id:<repo>/<name>` or an account (repeatable, comma-separated)
    #[arg(long, value_name = "ENTRIES")]
    skip: Vec<String>,

    /// Path to TOML crawler configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Organization directory used to label accounts
    #[arg(long, value_name = "FILE")]
    orgs_config: Option<PathBuf>,

    /// Maximum attempts per remote call
    #[arg(long, value_name = "N")]
    max_retry: Option<u32>,

    /// Hub access token
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Hub endpoint override (e.g. a mirror)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Number of sources crawled at the same time
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Directory under which fresh output directories are created
    #[arg(long, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Resolve the target and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(&cli)?;
    let request = build_request(&cli);

    let plan = plan_crawl(&config, &request)
        .with_context(|| format!("Failed to resolve target '{}'", cli.target))?;

    if cli.dry_run {
        handle_dry_run(&plan);
        return Ok(());
    }

    let report = execute(&config, &plan)
        .await
        .with_context(|| format!("Crawl of '{}' aborted", cli.target))?;
    print_report(&report);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("oslm_crawler=info,warn"),
            1 => EnvFilter::new("oslm_crawler=debug,info"),
            2 => EnvFilter::new("oslm_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command line overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_retry) = cli.max_retry {
        config.retry.max_attempts = max_retry;
    }
    if let Some(endpoint) = &cli.endpoint {
        config.hub.endpoint = Some(endpoint.clone());
    }
    if let Some(token) = &cli.token {
        config.hub.token = Some(token.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_sources = concurrency;
    }
    if let Some(root) = &cli.output_root {
        config.output.root = root.clone();
    }
    if let Some(orgs_config) = &cli.orgs_config {
        config.output.orgs_path = Some(orgs_config.clone());
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

fn build_request(cli: &Cli) -> ResolveRequest {
    let skip = SkipSet::parse(cli.skip.iter().flat_map(|entry| split_list(entry)));
    let mut request =
        ResolveRequest::new(cli.target.clone(), cli.platform, cli.category).with_skip(skip);
    if let Some(orgs) = &cli.orgs {
        let orgs: HashSet<String> = split_list(orgs).into_iter().collect();
        request = request.with_orgs(orgs);
    }
    request
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(plan: &ResolvedTarget) {
    println!("=== OSLM Crawler Dry Run ===\n");

    println!("Target:");
    println!("  Kind: {}", plan.kind);
    println!("  Platform: {}", plan.platform);
    println!("  Category: {}", plan.category);
    println!("  Output directory: {}", plan.output_dir.display());

    println!("\nSources ({}):", plan.sources.len());
    for source in &plan.sources {
        if source.org.is_empty() {
            println!("  - {}", source);
        } else {
            println!("  - {} [{}]", source, source.org);
        }
    }

    println!("\n=== Dry run complete ===");
}

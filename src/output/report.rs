//! Run summary
//!
//! This module provides the summary a crawl returns to its caller and the
//! routine that prints it for the command line.

use crate::model::{Category, Platform};
use crate::output::traits::SinkSummary;
use std::path::PathBuf;

/// Summary of one crawl batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub platform: Platform,
    pub category: Category,

    /// Number of sources drained
    pub sources: usize,

    /// Success records appended to the output log
    pub successes: u64,

    /// Failure records written to the error log
    pub failures: u64,

    /// Directory holding the log pair
    pub output_dir: PathBuf,

    /// Error log kept on disk, if any failures were recorded
    pub error_log: Option<PathBuf>,
}

impl CrawlReport {
    /// Report for a batch with nothing to fetch
    pub fn empty(platform: Platform, category: Category, output_dir: PathBuf) -> Self {
        Self {
            platform,
            category,
            sources: 0,
            successes: 0,
            failures: 0,
            output_dir,
            error_log: None,
        }
    }

    pub(crate) fn from_summary(
        platform: Platform,
        category: Category,
        sources: usize,
        output_dir: PathBuf,
        summary: SinkSummary,
    ) -> Self {
        Self {
            platform,
            category,
            sources,
            successes: summary.successes,
            failures: summary.failures,
            output_dir,
            error_log: summary.error_log,
        }
    }

    /// Total number of records written
    pub fn total(&self) -> u64 {
        self.successes + self.failures
    }

    /// Whether a follow-up resume run has work to do
    pub fn has_unfinished_work(&self) -> bool {
        self.error_log.is_some()
    }

    /// Percentage of records that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.total() > 0 {
            (self.successes as f64 / self.total() as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Batch:");
    println!("  Platform: {}", report.platform);
    println!("  Category: {}", report.category);
    println!("  Output directory: {}", report.output_dir.display());
    println!();

    println!("Results:");
    println!("  Sources processed: {}", report.sources);
    println!("  Records written: {}", report.total());
    println!("  Successes: {}", report.successes);
    println!("  Failures: {}", report.failures);
    println!("  Success rate: {:.1}%", report.success_rate());
    println!();

    if let Some(error_log) = &report.error_log {
        println!("Unfinished work recorded in {}", error_log.display());
        println!(
            "Resume with the output directory as target: {}",
            report.output_dir.display()
        );
        println!();
    }
}

//! Output sink traits and types
//!
//! This module defines the interface through which crawl results leave the
//! pipeline, and the summary a sink reports once a batch is complete.

use crate::model::FetchResult;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl OutputError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// What a sink wrote during one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkSummary {
    pub successes: u64,
    pub failures: u64,
    pub output_log: PathBuf,
    /// Present when the error log was kept on disk
    pub error_log: Option<PathBuf>,
}

/// Destination for the results of one `(output directory, category)` batch
///
/// A sink has a single writer; callers funnel every result through one
/// `&mut` handle so lines from different sources never interleave.
pub trait ResultSink {
    /// Routes one result to the success or error log
    fn record(&mut self, result: &FetchResult) -> OutputResult<()>;

    /// Number of failures recorded so far
    fn failures(&self) -> u64;

    /// Completes the batch; an error log with no failures is removed
    ///
    /// Must only be called after every source of the batch has been drained.
    fn finish(&mut self) -> OutputResult<SinkSummary>;

    /// Flushes without the cleanup step, for batches cut short by a fatal error
    fn abort(&mut self) -> OutputResult<SinkSummary>;
}

//! Output module for crawl results
//!
//! This module handles:
//! - Writing success and failure records to the JSON-lines log pair
//! - Reading a previous error log back for resume
//! - Summarizing a finished batch

mod report;
mod sink;
mod traits;

pub use report::{print_report, CrawlReport};
pub use sink::{error_log_path, output_log_path, read_records, JsonlSink};
pub use traits::{OutputError, OutputResult, ResultSink, SinkSummary};

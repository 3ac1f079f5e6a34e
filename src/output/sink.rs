//! JSON-lines result sink
//!
//! Each `(output directory, category)` batch owns two files:
//! - `raw_{category}_data.jsonl`, opened for append so successes accumulate
//!   across runs and resumes
//! - `err_{category}_data.jsonl`, truncated when the batch starts and removed
//!   at the end if nothing failed
//!
//! The existence of the error log therefore means "this directory has
//! unfinished work".

use crate::model::{Category, FetchResult};
use crate::output::traits::{OutputError, OutputResult, ResultSink, SinkSummary};
use crate::CrawlError;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path of the success log for `category` inside `dir`
pub fn output_log_path(dir: &Path, category: Category) -> PathBuf {
    dir.join(format!("raw_{}_data.jsonl", category))
}

/// Path of the error log for `category` inside `dir`
pub fn error_log_path(dir: &Path, category: Category) -> PathBuf {
    dir.join(format!("err_{}_data.jsonl", category))
}

/// Sink writing one JSON object per line
#[derive(Debug)]
pub struct JsonlSink {
    output_path: PathBuf,
    error_path: PathBuf,
    output: BufWriter<File>,
    errors: BufWriter<File>,
    successes: u64,
    failures: u64,
}

impl JsonlSink {
    /// Opens the log pair for `category` in `dir`
    ///
    /// The directory must already exist.
    pub fn open(dir: &Path, category: Category) -> OutputResult<Self> {
        let output_path = output_log_path(dir, category);
        let error_path = error_log_path(dir, category);

        let output = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&output_path)
            .map_err(|e| OutputError::io(&output_path, e))?;
        let errors = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&error_path)
            .map_err(|e| OutputError::io(&error_path, e))?;

        tracing::info!("Output log: {}", output_path.display());
        tracing::info!("Error log: {}", error_path.display());

        Ok(Self {
            output_path,
            error_path,
            output: BufWriter::new(output),
            errors: BufWriter::new(errors),
            successes: 0,
            failures: 0,
        })
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.output
            .flush()
            .map_err(|e| OutputError::io(&self.output_path, e))?;
        self.errors
            .flush()
            .map_err(|e| OutputError::io(&self.error_path, e))
    }

    fn summary(&self, keep_error_log: bool) -> SinkSummary {
        SinkSummary {
            successes: self.successes,
            failures: self.failures,
            output_log: self.output_path.clone(),
            error_log: keep_error_log.then(|| self.error_path.clone()),
        }
    }
}

/// Serializes `result` and writes it as one complete, flushed line
fn write_line(writer: &mut BufWriter<File>, path: &Path, result: &FetchResult) -> OutputResult<()> {
    let mut line = serde_json::to_vec(result)?;
    line.push(b'\n');
    writer
        .write_all(&line)
        .and_then(|_| writer.flush())
        .map_err(|e| OutputError::io(path, e))
}

impl ResultSink for JsonlSink {
    fn record(&mut self, result: &FetchResult) -> OutputResult<()> {
        if result.is_error() {
            tracing::debug!("error record: {}/{}", result.repo, result.name);
            write_line(&mut self.errors, &self.error_path, result)?;
            self.failures += 1;
        } else {
            tracing::debug!("record: {}/{}", result.repo, result.name);
            write_line(&mut self.output, &self.output_path, result)?;
            self.successes += 1;
        }
        Ok(())
    }

    fn failures(&self) -> u64 {
        self.failures
    }

    fn finish(&mut self) -> OutputResult<SinkSummary> {
        self.flush()?;
        if self.failures == 0 {
            match std::fs::remove_file(&self.error_path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(OutputError::io(&self.error_path, e)),
            }
            Ok(self.summary(false))
        } else {
            Ok(self.summary(true))
        }
    }

    fn abort(&mut self) -> OutputResult<SinkSummary> {
        self.flush()?;
        Ok(self.summary(true))
    }
}

/// Reads every record of a JSON-lines log
///
/// A missing file yields no records; blank lines are ignored and a malformed
/// line is an error.
pub fn read_records(path: &Path) -> Result<Vec<FetchResult>, CrawlError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| CrawlError::ResumeLog {
            path: path.display().to_string(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemStats;
    use tempfile::TempDir;

    fn success(name: &str) -> FetchResult {
        FetchResult::success(
            "acme",
            name,
            Category::Model,
            "2025-12-30",
            ItemStats {
                downloads: 1,
                likes: 2,
                discussion_count: Some(0),
                discussion_message_count: Some(0),
                link: format!("https://hub.test/acme/{}", name),
            },
        )
    }

    fn failure(name: &str) -> FetchResult {
        FetchResult::failure("acme", name, Category::Model, "2025-12-30", "timed out")
    }

    fn line_count(path: &Path) -> usize {
        std::fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_paths() {
        let dir = Path::new("/data/huggingface_2025-12-30");
        assert_eq!(
            output_log_path(dir, Category::Dataset),
            dir.join("raw_dataset_data.jsonl")
        );
        assert_eq!(error_log_path(dir, Category::Model), dir.join("err_model_data.jsonl"));
    }

    #[test]
    fn test_clean_batch_removes_error_log() {
        let dir = TempDir::new().unwrap();
        let mut sink = JsonlSink::open(dir.path(), Category::Model).unwrap();
        assert!(error_log_path(dir.path(), Category::Model).exists());

        sink.record(&success("a")).unwrap();
        sink.record(&success("b")).unwrap();
        let summary = sink.finish().unwrap();

        assert_eq!(summary.successes, 2);
        assert_eq!(summary.failures, 0);
        assert!(summary.error_log.is_none());
        assert!(!error_log_path(dir.path(), Category::Model).exists());
        assert_eq!(line_count(&output_log_path(dir.path(), Category::Model)), 2);
    }

    #[test]
    fn test_failures_keep_error_log() {
        let dir = TempDir::new().unwrap();
        let mut sink = JsonlSink::open(dir.path(), Category::Model).unwrap();

        sink.record(&success("a")).unwrap();
        sink.record(&failure("b")).unwrap();
        sink.record(&failure("")).unwrap();
        let summary = sink.finish().unwrap();

        let err_path = error_log_path(dir.path(), Category::Model);
        assert_eq!(summary.failures, 2);
        assert_eq!(summary.error_log.as_deref(), Some(err_path.as_path()));
        assert_eq!(line_count(&err_path), 2);

        let records = read_records(&err_path).unwrap();
        assert_eq!(records[0].name, "b");
        assert!(records.iter().all(FetchResult::is_error));
    }

    #[test]
    fn test_output_log_appends_across_runs() {
        let dir = TempDir::new().unwrap();

        let mut first = JsonlSink::open(dir.path(), Category::Dataset).unwrap();
        first.record(&success("a")).unwrap();
        first.record(&failure("b")).unwrap();
        first.finish().unwrap();

        let mut second = JsonlSink::open(dir.path(), Category::Dataset).unwrap();
        // Reopening truncates the previous error record
        assert_eq!(line_count(&error_log_path(dir.path(), Category::Dataset)), 0);
        second.record(&success("b")).unwrap();
        second.finish().unwrap();

        assert_eq!(line_count(&output_log_path(dir.path(), Category::Dataset)), 2);
        assert!(!error_log_path(dir.path(), Category::Dataset).exists());
    }

    #[test]
    fn test_abort_keeps_error_log() {
        let dir = TempDir::new().unwrap();
        let mut sink = JsonlSink::open(dir.path(), Category::Model).unwrap();
        sink.record(&success("a")).unwrap();
        let summary = sink.abort().unwrap();
        assert!(summary.error_log.is_some());
        assert!(error_log_path(dir.path(), Category::Model).exists());
    }

    #[test]
    fn test_read_records_missing_file() {
        let dir = TempDir::new().unwrap();
        let records = read_records(&dir.path().join("nope.jsonl")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_read_records_malformed_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("err_model_data.jsonl");
        std::fs::write(&path, "{\"repo\":\"a\"\nnot json\n").unwrap();
        match read_records(&path) {
            Err(CrawlError::ResumeLog { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected resume log error, got {:?}", other),
        }
    }
}

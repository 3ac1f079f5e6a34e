//! Crawler coordinator - drains sources into the result sink
//!
//! This module contains the main crawl loop:
//! - Up to `max_concurrent_sources` fetch streams run at once
//! - Every result funnels through one consumer that owns the sink
//! - Error-log cleanup happens only after the merged stream is exhausted

use crate::crawler::FetchEngine;
use crate::model::Source;
use crate::output::{CrawlReport, JsonlSink, ResultSink};
use crate::target::ResolvedTarget;
use crate::Result;
use futures::stream::{self, StreamExt};

/// Main crawler coordinator structure
#[derive(Debug)]
pub struct Coordinator {
    engine: FetchEngine,
    max_concurrent_sources: usize,
}

impl Coordinator {
    /// Creates a coordinator draining at most `max_concurrent_sources` at once
    pub fn new(engine: FetchEngine, max_concurrent_sources: usize) -> Self {
        Self {
            engine,
            max_concurrent_sources: max_concurrent_sources.max(1),
        }
    }

    /// Streams every result of `sources` into `sink`
    ///
    /// Remote failures arrive as failure records and never stop the loop. An
    /// input-validation error is returned as soon as it surfaces; results
    /// recorded before it stay in the sink.
    pub async fn drain(&self, sources: Vec<Source>, sink: &mut dyn ResultSink) -> Result<usize> {
        let count = sources.len();
        let engine = &self.engine;

        let results = stream::iter(sources)
            .map(move |source| {
                tracing::info!("Fetching {}", source);
                engine.fetch(source)
            })
            .flatten_unordered(self.max_concurrent_sources);
        futures::pin_mut!(results);

        let mut processed = 0u64;
        while let Some(result) = results.next().await {
            let result = result?;
            sink.record(&result)?;
            processed += 1;

            if processed % 100 == 0 {
                tracing::info!(
                    "Progress: {} records written, {} failures",
                    processed,
                    sink.failures()
                );
            }
        }

        Ok(count)
    }

    /// Runs a resolved target to completion
    ///
    /// Creates the output directory, opens the log pair, drains every source
    /// and finishes the sink. A target without sources touches nothing on
    /// disk. On a fatal error the sink is flushed but the error log is kept.
    pub async fn run(&self, plan: &ResolvedTarget) -> Result<CrawlReport> {
        if plan.sources.is_empty() {
            tracing::info!("No sources to crawl");
            return Ok(CrawlReport::empty(
                plan.platform,
                plan.category,
                plan.output_dir.clone(),
            ));
        }

        std::fs::create_dir_all(&plan.output_dir)?;
        let mut sink = JsonlSink::open(&plan.output_dir, plan.category)?;

        tracing::info!(
            "Crawling {} sources on {} ({} at a time)",
            plan.sources.len(),
            plan.platform,
            self.max_concurrent_sources
        );
        let start_time = std::time::Instant::now();

        let sources = match self.drain(plan.sources.clone(), &mut sink).await {
            Ok(sources) => sources,
            Err(e) => {
                if let Err(abort_error) = sink.abort() {
                    tracing::warn!("Failed to flush output after fatal error: {}", abort_error);
                }
                return Err(e);
            }
        };

        let summary = sink.finish()?;
        tracing::info!(
            "Crawl finished in {:.1}s: {} successes, {} failures",
            start_time.elapsed().as_secs_f64(),
            summary.successes,
            summary.failures
        );

        Ok(CrawlReport::from_summary(
            plan.platform,
            plan.category,
            sources,
            plan.output_dir.clone(),
            summary,
        ))
    }
}

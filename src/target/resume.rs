//! Rebuilding sources from a previous run's error log

use crate::model::{Category, Platform, Source};
use crate::orgs::RepoOrgMap;
use crate::output::{error_log_path, read_records};
use std::collections::HashSet;
use std::path::Path;

/// Reads the `category` error log in `dir` back into sources
///
/// A record with an item name becomes a single-item source; a record with an
/// empty name (a failed listing page) becomes an enumerate-all source for its
/// account. Duplicates collapse to their first occurrence. A directory
/// without an error log has nothing left to do.
pub fn resume_sources(
    dir: &Path,
    platform: Platform,
    category: Category,
    repo_map: &RepoOrgMap,
) -> crate::Result<Vec<Source>> {
    let path = error_log_path(dir, category);
    if !path.exists() {
        tracing::info!("No error log at {}, nothing to resume", path.display());
        return Ok(Vec::new());
    }

    let records = read_records(&path)?;
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for record in records {
        let name = (!record.name.is_empty()).then(|| record.name.clone());
        let source = Source::new(
            platform,
            repo_map.lookup(&record.repo),
            record.repo,
            name,
            category,
        );
        if seen.insert(source.clone()) {
            sources.push(source);
        }
    }

    tracing::info!(
        "Resuming {} sources from {}",
        sources.len(),
        path.display()
    );
    Ok(sources)
}

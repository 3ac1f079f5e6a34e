//! Target resolution
//!
//! Turns the user's target string into the ordered list of sources to crawl
//! and the directory to write into. A target is, in priority order:
//! 1. an existing directory: resume from its error log, writing in place
//! 2. an existing file: an organization directory expanded per account
//! 3. `id:<repo>/<name>`: exactly one item
//! 4. anything else: a bare account, enumerated in full
//!
//! Organization allow-lists and skip sets are applied to every origin
//! afterwards, and surviving sources are validated before any network call.

mod resume;
mod skip;

pub use resume::resume_sources;
pub use skip::{split_list, SkipMatch, SkipSet};

use crate::hub::{validate_account, validate_repo_id};
use crate::model::{Category, Platform, Source};
use crate::orgs::{load_org_directory, OrgDirectory};
use crate::{CrawlError, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything the resolver needs to know about one invocation
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub target: String,
    pub platform: Platform,
    pub category: Category,
    /// Organization allow-list; `None` keeps every organization
    pub orgs: Option<HashSet<String>>,
    pub skip: SkipSet,
}

impl ResolveRequest {
    pub fn new(target: impl Into<String>, platform: Platform, category: Category) -> Self {
        Self {
            target: target.into(),
            platform,
            category,
            orgs: None,
            skip: SkipSet::new(),
        }
    }

    pub fn with_orgs<I, S>(mut self, orgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.orgs = Some(orgs.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_skip(mut self, skip: SkipSet) -> Self {
        self.skip = skip;
        self
    }
}

/// Where a resolved source list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Resume,
    OrgConfig,
    Identifier,
    Account,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetKind::Resume => "resume",
            TargetKind::OrgConfig => "organization config",
            TargetKind::Identifier => "identifier",
            TargetKind::Account => "account",
        };
        f.write_str(s)
    }
}

/// The outcome of target resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub kind: TargetKind,
    pub platform: Platform,
    pub category: Category,
    pub sources: Vec<Source>,
    /// Directory holding the log pair; not created by the resolver
    pub output_dir: PathBuf,
}

/// Directory name of a fresh run: `{platform}_{date}`
pub fn fresh_output_dir(root: &Path, platform: Platform, date: &str) -> PathBuf {
    root.join(format!("{}_{}", platform, date))
}

/// Resolves `request` into sources and an output directory
///
/// `default_orgs` labels accounts for the resume, identifier and account
/// forms; `output_root` and `date` name the directory of a fresh run.
pub fn resolve_target(
    request: &ResolveRequest,
    default_orgs: &OrgDirectory,
    output_root: &Path,
    date: &str,
) -> Result<ResolvedTarget> {
    let platform = request.platform;
    let category = request.category;

    if !platform.supports(category) {
        return Err(CrawlError::InvalidTarget {
            target: request.target.clone(),
            message: format!("{} does not host {}s", platform, category),
        });
    }

    let repo_map = default_orgs.repo_map(platform);
    let target_path = Path::new(&request.target);
    let fresh_dir = || fresh_output_dir(output_root, platform, date);

    let (kind, sources, output_dir) = if target_path.is_dir() {
        let sources = resume_sources(target_path, platform, category, &repo_map)?;
        (TargetKind::Resume, sources, target_path.to_path_buf())
    } else if target_path.is_file() {
        let directory = load_org_directory(target_path)?;
        let sources = expand_directory(&directory, platform, category);
        (TargetKind::OrgConfig, sources, fresh_dir())
    } else if let Some(id) = request.target.strip_prefix("id:") {
        let (repo, name) = split_identifier(id)
            .ok_or_else(|| CrawlError::InvalidIdentifier(request.target.clone()))?;
        let source = Source::new(
            platform,
            repo_map.lookup(repo),
            repo,
            Some(name.to_string()),
            category,
        );
        (TargetKind::Identifier, vec![source], fresh_dir())
    } else {
        let repo = request.target.as_str();
        let source = Source::new(platform, repo_map.lookup(repo), repo, None, category);
        (TargetKind::Account, vec![source], fresh_dir())
    };

    let total = sources.len();
    let sources = filter_sources(sources, request);
    for source in &sources {
        validate_source(source)?;
    }

    tracing::info!(
        "Resolved {} target '{}': {} of {} sources kept",
        kind,
        request.target,
        sources.len(),
        total
    );

    Ok(ResolvedTarget {
        kind,
        platform,
        category,
        sources,
        output_dir,
    })
}

/// One enumerate-all source per account of every organization
fn expand_directory(directory: &OrgDirectory, platform: Platform, category: Category) -> Vec<Source> {
    directory
        .orgs
        .iter()
        .flat_map(|info| {
            info.accounts(platform)
                .iter()
                .map(move |account| Source::new(platform, &info.org, account, None, category))
        })
        .collect()
}

/// Splits `repo/name`, requiring exactly two non-empty parts
fn split_identifier(id: &str) -> Option<(&str, &str)> {
    let mut parts = id.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(repo), Some(name), None) if !repo.is_empty() && !name.is_empty() => {
            Some((repo, name))
        }
        _ => None,
    }
}

fn filter_sources(sources: Vec<Source>, request: &ResolveRequest) -> Vec<Source> {
    sources
        .into_iter()
        .filter(|source| {
            if let Some(allowed) = &request.orgs {
                if !allowed.contains(&source.org) {
                    tracing::debug!("Dropping {}: organization not selected", source);
                    return false;
                }
            }
            if let Some(matched) = request.skip.matches(source) {
                tracing::debug!("Skipping {} ({:?} entry)", source, matched);
                return false;
            }
            true
        })
        .collect()
}

fn validate_source(source: &Source) -> Result<()> {
    let checked = match source.identifier() {
        Some(id) => validate_repo_id(&id),
        None => validate_account(&source.repo),
    };
    checked.map_err(|e| CrawlError::InvalidTarget {
        target: source.to_string(),
        message: e.to_string(),
    })
}

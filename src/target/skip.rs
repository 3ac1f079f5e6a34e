//! Skip-list matching
//!
//! Entries are tagged by prefix:
//! - `org:<label>` skips every source of an organization
//! - `id:<repo>/<name>` skips one item
//! - a bare string skips an account

use crate::model::Source;
use std::collections::HashSet;

/// Which skip entry a source matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipMatch {
    Org,
    Repo,
    Identifier,
}

/// Organizations, accounts and item identifiers to leave out of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    orgs: HashSet<String>,
    repos: HashSet<String>,
    ids: HashSet<String>,
}

impl SkipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a skip set from tagged entries; blank entries are ignored
    pub fn parse<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for entry in entries {
            set.insert(entry.as_ref());
        }
        set
    }

    pub fn insert(&mut self, entry: &str) {
        let entry = entry.trim();
        if entry.is_empty() {
            return;
        }

        if let Some(org) = entry.strip_prefix("org:") {
            self.orgs.insert(org.to_string());
        } else if let Some(id) = entry.strip_prefix("id:") {
            self.ids.insert(id.to_string());
        } else {
            self.repos.insert(entry.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.orgs.len() + self.repos.len() + self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the kind of entry `source` matches, if any
    pub fn matches(&self, source: &Source) -> Option<SkipMatch> {
        if !source.org.is_empty() && self.orgs.contains(&source.org) {
            return Some(SkipMatch::Org);
        }
        if self.repos.contains(&source.repo) {
            return Some(SkipMatch::Repo);
        }
        match source.identifier() {
            Some(id) if self.ids.contains(&id) => Some(SkipMatch::Identifier),
            _ => None,
        }
    }
}

/// Splits a comma-separated command line list
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

use crate::model::Platform;
use serde::Deserialize;
use std::collections::HashMap;

/// One organization's metadata and per-platform account lists
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrgInfo {
    pub org: String,

    #[serde(rename = "type", default)]
    pub org_type: String,

    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub focus: Vec<String>,

    #[serde(default)]
    pub hf_accounts: Vec<String>,

    #[serde(default)]
    pub ms_accounts: Vec<String>,
}

impl OrgInfo {
    /// Accounts this organization publishes under on `platform`
    pub fn accounts(&self, platform: Platform) -> &[String] {
        match platform {
            Platform::Huggingface => &self.hf_accounts,
            Platform::ModelScope => &self.ms_accounts,
        }
    }
}

/// The loaded set of organizations
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrgDirectory {
    #[serde(default)]
    pub orgs: Vec<OrgInfo>,
}

impl OrgDirectory {
    pub fn new(orgs: Vec<OrgInfo>) -> Self {
        Self { orgs }
    }

    pub fn len(&self) -> usize {
        self.orgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }

    /// Builds the account -> organization lookup for one platform
    ///
    /// Account uniqueness is enforced when the directory is loaded, so each
    /// account maps to exactly one organization here.
    pub fn repo_map(&self, platform: Platform) -> RepoOrgMap {
        let mut map = HashMap::new();
        for info in &self.orgs {
            for account in info.accounts(platform) {
                map.insert(account.clone(), info.org.clone());
            }
        }
        RepoOrgMap { map }
    }
}

/// Reverse lookup from a hub account to its organization label
#[derive(Debug, Clone, Default)]
pub struct RepoOrgMap {
    map: HashMap<String, String>,
}

impl RepoOrgMap {
    /// Returns the organization for `repo`, or an empty label if unknown
    pub fn lookup(&self, repo: &str) -> &str {
        self.map.get(repo).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

use crate::model::{Category, Platform};

/// One resolved crawl request
///
/// A `Source` with no `name` asks for every item under the `repo` account;
/// with a name it asks for exactly that item. Sources are built by the target
/// resolver and consumed once by the fetch engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub platform: Platform,
    /// Organization label; empty when the account is not in the org directory
    pub org: String,
    /// Remote account name
    pub repo: String,
    /// Specific item name, `None` for enumerate-all
    pub name: Option<String>,
    pub category: Category,
}

impl Source {
    pub fn new(
        platform: Platform,
        org: impl Into<String>,
        repo: impl Into<String>,
        name: Option<String>,
        category: Category,
    ) -> Self {
        Self {
            platform,
            org: org.into(),
            repo: repo.into(),
            name,
            category,
        }
    }

    /// Returns `repo/name` for single-item sources
    pub fn identifier(&self) -> Option<String> {
        self.name
            .as_ref()
            .map(|name| format!("{}/{}", self.repo, name))
    }

    pub fn is_enumerate_all(&self) -> bool {
        self.name.is_none()
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}/{} ({})", self.platform, self.repo, name, self.category),
            None => write!(f, "{}:{}/* ({})", self.platform, self.repo, self.category),
        }
    }
}

//! Organization directory
//!
//! The org directory maps organizations to the hub accounts they publish
//! under. Target resolution expands it into sources, and resumed runs use the
//! reverse account -> organization lookup to re-attach organization labels.

mod loader;
mod types;

pub use loader::{load_org_directory, parse_org_directory};
pub use types::{OrgDirectory, OrgInfo, RepoOrgMap};

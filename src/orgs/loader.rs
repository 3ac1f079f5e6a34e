use crate::model::Platform;
use crate::orgs::types::OrgDirectory;
use crate::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Loads an organization directory from a TOML file
///
/// The file holds a top-level `[[orgs]]` array. Any structural problem is a
/// fatal configuration error.
///
/// # Example
///
/// ```toml
/// [[orgs]]
/// org = "DeepSeek"
/// type = "company"
/// country = "China"
/// focus = ["llm"]
/// hf_accounts = ["deepseek-ai"]
/// ms_accounts = ["deepseek-ai"]
/// ```
pub fn load_org_directory(path: &Path) -> Result<OrgDirectory, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let directory = parse_org_directory(&content)?;
    tracing::debug!(
        "Loaded {} organizations from {}",
        directory.len(),
        path.display()
    );
    Ok(directory)
}

/// Parses and validates organization directory content
pub fn parse_org_directory(content: &str) -> Result<OrgDirectory, ConfigError> {
    let directory: OrgDirectory = toml::from_str(content)?;
    validate_directory(&directory)?;
    Ok(directory)
}

fn validate_directory(directory: &OrgDirectory) -> Result<(), ConfigError> {
    for info in &directory.orgs {
        if info.org.trim().is_empty() {
            return Err(ConfigError::Validation(
                "organization name cannot be empty".to_string(),
            ));
        }
    }

    // An account may belong to one organization per platform
    for platform in Platform::all() {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for info in &directory.orgs {
            for account in info.accounts(platform) {
                if account.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "organization '{}' lists an empty {} account",
                        info.org, platform
                    )));
                }
                if let Some(first) = owners.insert(account.as_str(), info.org.as_str()) {
                    return Err(ConfigError::DuplicateAccount {
                        platform,
                        account: account.clone(),
                        first: first.to_string(),
                        second: info.org.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

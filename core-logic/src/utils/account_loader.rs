use crate::account::AccountCredential;
use crate::error::AccountError;
use crate::traits::CredentialLoader;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads account credentials from a text file, one per line.
///
/// The file is read again on every call so edits take effect on the next pass.
#[derive(Debug, Clone)]
pub struct AccountLoader {
    path: PathBuf,
}

impl AccountLoader {
    pub const DEFAULT_FILE: &'static str = "data.txt";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blank lines and `#` comments are skipped; order is preserved.
    pub fn parse(content: &str) -> Vec<AccountCredential> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(AccountCredential::new)
            .collect()
    }
}

#[async_trait]
impl CredentialLoader for AccountLoader {
    async fn load_credentials(&self) -> Result<Vec<AccountCredential>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AccountError::ListUnreadable {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        let accounts = Self::parse(&content);
        debug!(
            "Loaded {} accounts from {}",
            accounts.len(),
            self.path.display()
        );
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let accounts = AccountLoader::parse("first\n\n  # note\nsecond\r\n   \nthird");
        let raw: Vec<&str> = accounts.iter().map(|a| a.as_str()).collect();
        assert_eq!(raw, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_parse_empty_file() {
        assert!(AccountLoader::parse("").is_empty());
    }
}

//! Account credential and session token types.
//!
//! Both hold secrets, so they are zeroized on drop and redacted in `Debug`.

use crate::error::AccountError;
use serde_json::Value;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One account's opaque init-data blob, exactly as read from the account list.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccountCredential {
    raw: String,
}

impl AccountCredential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Decodes the `user` query field and returns its `first_name`.
    pub fn first_name(&self) -> Result<String, AccountError> {
        let user = url::form_urlencoded::parse(self.raw.as_bytes())
            .find(|(key, _)| key == "user")
            .map(|(_, value)| value.into_owned())
            .ok_or(AccountError::MissingUserField)?;

        let parsed: Value =
            serde_json::from_str(&user).map_err(|e| AccountError::InvalidUserField {
                reason: e.to_string(),
            })?;

        Ok(parsed
            .get("first_name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown")
            .to_string())
    }

    /// Name used in log lines. Falls back to "Unknown" and never fails.
    pub fn display_name(&self) -> String {
        match self.first_name() {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Error extracting first_name: {}", e);
                "Unknown".to_string()
            }
        }
    }
}

impl fmt::Debug for AccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredential")
            .field("raw", &"***REDACTED***")
            .finish()
    }
}

/// Bearer token returned by authentication, valid for one account pass.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***REDACTED***)")
    }
}

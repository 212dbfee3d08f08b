//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the application layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Account(AccountError),

    #[error(transparent)]
    Network(NetworkError),

    #[error(transparent)]
    Identity(IdentityError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<AccountError> for CoreError {
    fn from(e: AccountError) -> Self {
        CoreError::Account(e)
    }
}

impl From<NetworkError> for CoreError {
    fn from(e: NetworkError) -> Self {
        CoreError::Network(e)
    }
}

impl From<IdentityError> for CoreError {
    fn from(e: IdentityError) -> Self {
        CoreError::Identity(e)
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid base URL format: '{url}'")]
    InvalidBaseUrl { url: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Account list and credential errors
#[derive(Error, Debug, Clone)]
pub enum AccountError {
    #[error("Account list not readable at '{path}': {reason}")]
    ListUnreadable { path: String, reason: String },

    #[error("Credential has no user field")]
    MissingUserField,

    #[error("Credential user field is not valid JSON: {reason}")]
    InvalidUserField { reason: String },
}

/// Remote API errors. Every gateway failure is normalized into one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Request timeout after {timeout_ms}ms to {endpoint}")]
    Timeout { timeout_ms: u64, endpoint: String },

    #[error("Transport error calling {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("HTTP error {status_code} from {endpoint}")]
    HttpError { status_code: u16, endpoint: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Response from {endpoint} is missing '{field}'")]
    MissingField { endpoint: String, field: String },
}

/// Identity generation errors
#[derive(Error, Debug, Clone)]
pub enum IdentityError {
    #[error("User agent corpus not readable at '{path}': {reason}")]
    CorpusUnreadable { path: String, reason: String },

    #[error("User agent corpus at '{path}' is empty or contains invalid data")]
    CorpusEmpty { path: String },

    #[error("Invalid user agent generated: '{user_agent}'")]
    InvalidUserAgent { user_agent: String },

    #[error("Header '{name}' has an invalid value")]
    InvalidHeader { name: String },
}

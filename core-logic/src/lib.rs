//! # Core Logic - Shared Utilities for Reward Bots
//!
//! This crate provides the platform-agnostic plumbing shared by bot crates:
//! credential loading, logging, wait scheduling and error types.
//!
//! ## Modules
//!
//! - [`account`] - Account credential and session token types
//! - [`config`] - Delay ranges and schedule configuration
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Per-process pass/account/subsystem counters
//! - [`traits`] - Core trait definitions
//! - [`utils`] - Utility modules (loader, logger, countdown, scheduler)

// Module declarations - internal modules marked pub(crate)
pub mod account;
pub mod config;
pub mod error;
pub mod metrics;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use account::{AccountCredential, SessionToken};
pub use config::{DelayRange, ScheduleConfig};
pub use error::{AccountError, ConfigError, CoreError, IdentityError, NetworkError};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use traits::{CredentialLoader, Subsystem, SubsystemReport};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    compute_wait, format_remaining, setup_logger, setup_logger_with_file, wait_with_countdown,
    AccountLoader, RunState, WorkerRunner, SUCCESS_TARGET,
};

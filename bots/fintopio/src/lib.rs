//! Unattended reward claiming for Fintopio accounts.
//!
//! Every pass walks the account list in order. Each account gets a fresh
//! request identity, authenticates, checks in, then polls farming, the
//! diamond, tasks and the space-tapper game concurrently.

pub mod account;
pub mod api;
pub mod config;
pub mod identity;
pub mod runner;
pub mod subsystem;

pub use account::{AccountOrchestrator, AccountOutcome, AccountStatus, SubsystemOutcome};
pub use config::FintopioConfig;
pub use identity::{Identity, IdentityProvider};
pub use runner::{BotRunner, PassSummary};

use crate::account::AccountCredential;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Outcome of one subsystem pass for one account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubsystemReport {
    pub message: String,
    /// Next time this subsystem expects to have something to do, if known
    pub next_event_at: Option<DateTime<Utc>>,
}

impl SubsystemReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            next_event_at: None,
        }
    }

    pub fn with_next_event(mut self, at: DateTime<Utc>) -> Self {
        self.next_event_at = Some(at);
        self
    }
}

/// An independently pollable reward mechanism.
///
/// `run` returning `Err` means the subsystem's state could not be fetched and
/// nothing was done for this account. Per-item failures are handled inside.
#[async_trait]
pub trait Subsystem<Ctx>: Send + Sync {
    /// Returns the name of the subsystem
    fn name(&self) -> &str;

    /// Polls state and issues whatever claims the state calls for
    async fn run(&self, ctx: &Ctx) -> Result<SubsystemReport>;
}

#[async_trait]
pub trait CredentialLoader: Send + Sync {
    /// Load the ordered account list. Called once per pass.
    async fn load_credentials(&self) -> Result<Vec<AccountCredential>>;
}

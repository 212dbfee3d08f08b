use crate::account::{AccountOrchestrator, AccountStatus};
use crate::identity::IdentityProvider;
use anyhow::Result;
use chrono::{DateTime, Utc};
use core_logic::{
    compute_wait, format_remaining, wait_with_countdown, CredentialLoader, MetricsCollector,
    RunState, ScheduleConfig,
};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
    pub accounts: usize,
    pub processed: usize,
    pub skipped: usize,
    pub subsystem_failures: usize,
    pub duration: Duration,
    pub next_wake: Option<DateTime<Utc>>,
}

/// Drives passes over the account list forever, sleeping between them.
pub struct BotRunner {
    loader: Box<dyn CredentialLoader>,
    orchestrator: AccountOrchestrator,
    identities: IdentityProvider,
    state: RunState,
    metrics: MetricsCollector,
    schedule: ScheduleConfig,
}

impl BotRunner {
    pub fn new(
        loader: Box<dyn CredentialLoader>,
        orchestrator: AccountOrchestrator,
        identities: IdentityProvider,
    ) -> Self {
        let schedule = orchestrator.config().schedule;
        Self {
            loader,
            orchestrator,
            identities,
            state: RunState::default(),
            metrics: MetricsCollector::new(),
            schedule,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// One pass over every account, strictly in file order. Fails only when
    /// the account list cannot be read.
    pub async fn run_pass(&mut self) -> Result<PassSummary> {
        let started = Instant::now();
        let credentials = self.loader.load_credentials().await?;
        self.state.reset();

        let mut summary = PassSummary {
            accounts: credentials.len(),
            ..PassSummary::default()
        };
        if credentials.is_empty() {
            warn!("Account list is empty");
        }

        for (index, credential) in credentials.iter().enumerate() {
            let identity = self.identities.generate();
            let outcome = self
                .orchestrator
                .process(index, credential, identity)
                .await;

            match outcome.status {
                AccountStatus::Completed => {
                    summary.processed += 1;
                    self.metrics.record_account_processed();
                }
                AccountStatus::AuthFailed | AccountStatus::ProfileFailed => {
                    summary.skipped += 1;
                    self.metrics.record_account_skipped();
                }
            }

            for subsystem in &outcome.subsystems {
                self.metrics.record_subsystem(subsystem.is_success());
                if !subsystem.is_success() {
                    summary.subsystem_failures += 1;
                }
            }

            if index == 0 {
                self.state.record(outcome.next_diamond_at);
            }
        }

        summary.duration = started.elapsed();
        summary.next_wake = self.state.next_wake;
        self.metrics.record_pass(summary.duration);

        info!(
            "Pass complete: {} accounts | {} processed | {} skipped | {} subsystem failures | {:.1}s",
            summary.accounts,
            summary.processed,
            summary.skipped,
            summary.subsystem_failures,
            summary.duration.as_secs_f64()
        );
        Ok(summary)
    }

    /// Runs until `token` is cancelled, or after a single pass when `once` is set.
    pub async fn run(&mut self, token: CancellationToken, once: bool) -> Result<()> {
        loop {
            if token.is_cancelled() {
                break;
            }

            self.run_pass().await?;
            if once {
                break;
            }

            let wait = compute_wait(&self.state, Utc::now(), &self.schedule);
            info!("Next pass in {}", format_remaining(wait));
            if !wait_with_countdown(wait, "continue", &token).await {
                break;
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            "Stopping after {} passes | {} accounts processed | {} skipped | subsystem success {:.1}%",
            snapshot.passes,
            snapshot.accounts.processed,
            snapshot.accounts.skipped,
            snapshot.subsystems.success_rate
        );
        Ok(())
    }
}

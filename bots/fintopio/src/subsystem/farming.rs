use super::{pause, Subsystem, SubsystemContext, SubsystemReport};
use crate::api::models::{FarmingPhase, FarmingState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_logic::{format_remaining, success};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmingAction {
    Start,
    ClaimAndRestart,
    Wait { finish: DateTime<Utc> },
    Skip(String),
}

/// Decides what to do with the farm given its state at `now`.
pub fn plan(state: &FarmingState, now: DateTime<Utc>) -> FarmingAction {
    match state.phase() {
        FarmingPhase::Idling => FarmingAction::Start,
        FarmingPhase::Farming | FarmingPhase::Farmed => match state.finish_at() {
            Some(finish) if now >= finish => FarmingAction::ClaimAndRestart,
            Some(finish) => FarmingAction::Wait { finish },
            None => FarmingAction::Skip("No completion time available.".to_string()),
        },
        FarmingPhase::Unknown(other) => {
            FarmingAction::Skip(format!("Unknown farming state: {}", other))
        }
    }
}

pub struct FarmingHandler;

impl FarmingHandler {
    async fn start(&self, ctx: &SubsystemContext) -> Option<DateTime<Utc>> {
        pause(&ctx.config.farming.start_delay, "starting farm").await;
        info!("Starting farm...");

        match ctx.api.start_farming().await {
            Ok(state) => match state.as_ref().and_then(FarmingState::finish_at) {
                Some(finish) => {
                    info!("Farming completion time: {}", finish.format("%Y-%m-%d %H:%M:%S"));
                    Some(finish)
                }
                None => {
                    info!("No completion time available.");
                    None
                }
            },
            Err(e) => {
                error!("Error starting farming: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Subsystem<SubsystemContext> for FarmingHandler {
    async fn run(&self, ctx: &SubsystemContext) -> Result<SubsystemReport> {
        let state = ctx
            .api
            .farming_state()
            .await
            .context("Error checking farming state")?;

        let report = match plan(&state, Utc::now()) {
            FarmingAction::Start => {
                let finish = self.start(ctx).await;
                with_finish(SubsystemReport::new("started"), finish)
            }
            FarmingAction::ClaimAndRestart => {
                match ctx.api.claim_farming().await {
                    Ok(_) => success!("Farm claimed successfully!"),
                    Err(e) => error!("Error claiming farm: {}", e),
                }
                let finish = self.start(ctx).await;
                with_finish(SubsystemReport::new("claimed and restarted"), finish)
            }
            FarmingAction::Wait { finish } => {
                let remaining = (finish - Utc::now()).to_std().unwrap_or_default();
                info!("Farming completion in {}", format_remaining(remaining));
                SubsystemReport::new("farming").with_next_event(finish)
            }
            FarmingAction::Skip(reason) => {
                warn!("{}", reason);
                SubsystemReport::new(reason)
            }
        };

        Ok(report)
    }

    fn name(&self) -> &str {
        "farming"
    }
}

fn with_finish(report: SubsystemReport, finish: Option<DateTime<Utc>>) -> SubsystemReport {
    match finish {
        Some(at) => report.with_next_event(at),
        None => report,
    }
}

use super::{pause, Subsystem, SubsystemContext, SubsystemReport};
use crate::api::models::DiamondState;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_logic::success;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiamondAction {
    Claim { number: String, reward: String },
    Wait(DateTime<Utc>),
    Unprocessable,
}

pub fn plan(state: &DiamondState) -> DiamondAction {
    match state.state.as_deref() {
        Some("available") => match &state.diamond_number {
            Some(number) => DiamondAction::Claim {
                number: number.to_string(),
                reward: state
                    .total_reward()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "0".to_string()),
            },
            None => DiamondAction::Unprocessable,
        },
        Some(_) => state
            .next_at()
            .map(DiamondAction::Wait)
            .unwrap_or(DiamondAction::Unprocessable),
        None => DiamondAction::Unprocessable,
    }
}

/// Claims the periodic diamond. The report's `next_event_at` carries the
/// next availability when the diamond is on cooldown.
pub struct DiamondHandler;

#[async_trait]
impl Subsystem<SubsystemContext> for DiamondHandler {
    async fn run(&self, ctx: &SubsystemContext) -> Result<SubsystemReport> {
        let state = ctx
            .api
            .diamond_state()
            .await
            .context("Error fetching diamond state")?;

        match plan(&state) {
            DiamondAction::Claim { number, reward } => {
                pause(&ctx.config.diamond.claim_delay, "claiming diamond").await;
                match ctx.api.claim_diamond(&number).await {
                    Ok(_) => {
                        success!("Success claim {} diamonds!", reward);
                        Ok(SubsystemReport::new(format!("claimed {}", reward)))
                    }
                    Err(e) => {
                        error!("Error claiming diamond: {}", e);
                        Ok(SubsystemReport::new("claim failed"))
                    }
                }
            }
            DiamondAction::Wait(next_at) => {
                info!(
                    "Next diamond time: {}",
                    next_at.format("%Y-%m-%d %H:%M:%S")
                );
                Ok(SubsystemReport::new("waiting").with_next_event(next_at))
            }
            DiamondAction::Unprocessable => {
                warn!("Unable to process diamond info");
                Ok(SubsystemReport::new("unprocessable"))
            }
        }
    }

    fn name(&self) -> &str {
        "diamond"
    }
}

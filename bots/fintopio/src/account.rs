//! One account, start to finish: authenticate, show where it stands, check
//! in, then run every reward subsystem side by side.

use crate::api::models::{DailyCheckIn, GemInventory, LeaderboardStanding, Profile, Scalar};
use crate::api::{ApiClient, Gateway, LeaderboardPeriod, RequestContext};
use crate::config::FintopioConfig;
use crate::identity::Identity;
use crate::subsystem::{
    DiamondHandler, FarmingHandler, GameHandler, Subsystem, SubsystemContext, SubsystemReport,
    TaskHandler,
};
use chrono::{DateTime, Utc};
use core_logic::{success, AccountCredential, NetworkError};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Completed,
    AuthFailed,
    ProfileFailed,
}

/// What one subsystem did for one account. `Err` holds the logged failure.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsystemOutcome {
    pub name: String,
    pub result: Result<SubsystemReport, String>,
}

impl SubsystemOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountOutcome {
    pub status: AccountStatus,
    pub subsystems: Vec<SubsystemOutcome>,
    /// Only ever set for the first account, and only when in the future
    pub next_diamond_at: Option<DateTime<Utc>>,
}

impl AccountOutcome {
    fn aborted(status: AccountStatus) -> Self {
        Self {
            status,
            subsystems: Vec::new(),
            next_diamond_at: None,
        }
    }
}

pub struct AccountOrchestrator {
    gateway: Arc<dyn Gateway>,
    config: Arc<FintopioConfig>,
    farming: FarmingHandler,
    diamond: DiamondHandler,
    tasks: TaskHandler,
    game: GameHandler,
}

impl AccountOrchestrator {
    pub fn new(gateway: Arc<dyn Gateway>, config: Arc<FintopioConfig>) -> Self {
        Self {
            gateway,
            config,
            farming: FarmingHandler,
            diamond: DiamondHandler,
            tasks: TaskHandler,
            game: GameHandler,
        }
    }

    pub fn config(&self) -> &FintopioConfig {
        &self.config
    }

    /// Processes the account at zero-based `index` with a freshly generated identity.
    pub async fn process(
        &self,
        index: usize,
        credential: &AccountCredential,
        identity: Identity,
    ) -> AccountOutcome {
        let name = credential.display_name();
        let span = info_span!("account", n = index + 1, name = %name);

        async move {
            info!("========== [ Account {} | {} ] ==========", index + 1, name);
            info!(
                "Device {} | {} | fingerprint {}",
                identity.device.model, identity.device.platform, identity.fingerprint
            );
            self.process_inner(index, credential, identity).await
        }
        .instrument(span)
        .await
    }

    async fn process_inner(
        &self,
        index: usize,
        credential: &AccountCredential,
        identity: Identity,
    ) -> AccountOutcome {
        let anonymous = ApiClient::new(
            Arc::clone(&self.gateway),
            RequestContext::new(identity.headers),
        );

        let token = match anonymous.authenticate(credential).await {
            Ok(token) => token,
            Err(e) => {
                error!("Authentication error: {}", e);
                return AccountOutcome::aborted(AccountStatus::AuthFailed);
            }
        };
        let api = anonymous.with_token(token);

        let (profile, standings, gems) = tokio::join!(
            api.profile(),
            join_all(LeaderboardPeriod::ALL.iter().map(|p| api.leaderboard(*p))),
            api.gem_inventory(),
        );

        let profile = match profile {
            Ok(profile) => profile,
            Err(e) => {
                error!("Error fetching profile: {}", e);
                return AccountOutcome::aborted(AccountStatus::ProfileFailed);
            }
        };
        display_profile(&profile);
        display_leaderboard(LeaderboardPeriod::ALL.iter().copied().zip(standings));
        display_gems(gems);

        match api.daily_check_in().await {
            Ok(check_in) => success!("{}", check_in_message(check_in.as_ref())),
            Err(e) => error!("Daily check-in error: {}", e),
        }

        let ctx = SubsystemContext::new(api, Arc::clone(&self.config));
        let (farming, diamond, tasks, game) = tokio::join!(
            run_isolated(&self.farming, &ctx),
            run_isolated(&self.diamond, &ctx),
            run_isolated(&self.tasks, &ctx),
            run_isolated(&self.game, &ctx),
        );

        let next_diamond_at = if index == 0 {
            diamond
                .result
                .as_ref()
                .ok()
                .and_then(|r| r.next_event_at)
                .filter(|at| *at > Utc::now())
        } else {
            None
        };

        AccountOutcome {
            status: AccountStatus::Completed,
            subsystems: vec![farming, diamond, tasks, game],
            next_diamond_at,
        }
    }
}

/// Runs one subsystem, logging its failure exactly once.
async fn run_isolated<S>(subsystem: &S, ctx: &SubsystemContext) -> SubsystemOutcome
where
    S: Subsystem<SubsystemContext>,
{
    let result = match subsystem.run(ctx).await {
        Ok(report) => Ok(report),
        Err(e) => {
            error!("{:#}", e);
            Err(format!("{:#}", e))
        }
    };
    SubsystemOutcome {
        name: subsystem.name().to_string(),
        result,
    }
}

/// Any 2xx check-in is a success; the reward is shown when the body carries one.
fn check_in_message(check_in: Option<&DailyCheckIn>) -> String {
    let reward = check_in.and_then(|c| c.daily_reward.as_ref());
    let days = check_in.and_then(|c| c.total_days.as_ref());
    match (reward, days) {
        (Some(reward), Some(days)) => {
            format!("Daily check-in successful! Reward: {} | Total days: {}", reward, days)
        }
        (Some(reward), None) => format!("Daily check-in successful! Reward: {}", reward),
        _ => "Daily check-in successful!".to_string(),
    }
}

fn display_profile(profile: &Profile) {
    let balance = profile
        .balance
        .as_ref()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "0".to_string());
    info!("Balance: {}", balance);

    if let Some(referrals) = &profile.referral_activations {
        let count = |v: &Option<Scalar>| {
            v.as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "0".to_string())
        };
        info!(
            "Referrals: {}/{}",
            count(&referrals.used),
            count(&referrals.total)
        );
    }
}

fn display_leaderboard(
    standings: impl Iterator<Item = (LeaderboardPeriod, Result<LeaderboardStanding, NetworkError>)>,
) {
    for (period, standing) in standings {
        match standing {
            Ok(standing) => info!(
                "{} rank: {} | score {}",
                period.label(),
                standing
                    .position
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                standing
                    .score
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string())
            ),
            Err(e) => warn!("Could not fetch {} leaderboard: {}", period.label(), e),
        }
    }
}

fn display_gems(gems: Result<GemInventory, NetworkError>) {
    match gems {
        Ok(inventory) if inventory.items.is_empty() => info!("Gems: none"),
        Ok(inventory) => {
            let listed: Vec<String> = inventory
                .items
                .iter()
                .map(|g| format!("{} x{}", g.name, g.amount))
                .collect();
            info!("Gems: {}", listed.join(", "));
        }
        Err(e) => warn!("Could not fetch gem inventory: {}", e),
    }
}

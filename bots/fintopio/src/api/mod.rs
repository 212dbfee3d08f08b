//! Remote API surface: endpoints, per-account request context and the
//! [`Gateway`] seam every call goes through.

pub mod client;
pub mod http;
pub mod models;

pub use client::ApiClient;
pub use http::HttpGateway;

use async_trait::async_trait;
use core_logic::{AccountCredential, NetworkError, SessionToken};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;

pub const ORIGIN: &str = "https://fintopio-tg.fintopio.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardPeriod {
    AllTime,
    Week,
    Month,
}

impl LeaderboardPeriod {
    pub const ALL: [LeaderboardPeriod; 3] = [Self::AllTime, Self::Week, Self::Month];

    pub fn as_query(&self) -> &'static str {
        match self {
            Self::AllTime => "all",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AllTime => "All-time",
            Self::Week => "Week",
            Self::Month => "Month",
        }
    }
}

/// Every remote capability the bot uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Auth(AccountCredential),
    Profile,
    DailyCheckIn,
    FarmingState,
    FarmingStart,
    FarmingClaim,
    DiamondState,
    DiamondComplete,
    GameSettings,
    GameSubmit,
    TaskList,
    TaskStart(String),
    TaskClaim(String),
    Leaderboard(LeaderboardPeriod),
    GemInventory,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Self::Auth(_)
            | Self::Profile
            | Self::FarmingState
            | Self::DiamondState
            | Self::GameSettings
            | Self::TaskList
            | Self::Leaderboard(_)
            | Self::GemInventory => Method::GET,
            Self::DailyCheckIn
            | Self::FarmingStart
            | Self::FarmingClaim
            | Self::DiamondComplete
            | Self::GameSubmit
            | Self::TaskStart(_)
            | Self::TaskClaim(_) => Method::POST,
        }
    }

    /// Path relative to the API base URL, without query string.
    pub fn path(&self) -> String {
        match self {
            Self::Auth(_) => "/auth/telegram".to_string(),
            Self::Profile => "/referrals/data".to_string(),
            Self::DailyCheckIn => "/daily-checkins".to_string(),
            Self::FarmingState => "/farming/state".to_string(),
            Self::FarmingStart => "/farming/farm".to_string(),
            Self::FarmingClaim => "/farming/claim".to_string(),
            Self::DiamondState => "/clicker/diamond/state".to_string(),
            Self::DiamondComplete => "/clicker/diamond/complete".to_string(),
            Self::GameSettings => "/hold/space-tappers/game-settings".to_string(),
            Self::GameSubmit => "/hold/space-tappers/add-new-result".to_string(),
            Self::TaskList => "/hold/tasks".to_string(),
            Self::TaskStart(id) => format!("/hold/tasks/{}/start", id),
            Self::TaskClaim(id) => format!("/hold/tasks/{}/claim", id),
            Self::Leaderboard(_) => "/hold/leaderboard".to_string(),
            Self::GemInventory => "/hold/gems/inventory".to_string(),
        }
    }

    /// Raw query string. Auth sends the init data exactly as stored.
    pub fn query(&self) -> Option<String> {
        match self {
            Self::Auth(credential) => Some(credential.as_str().to_string()),
            Self::Leaderboard(period) => Some(format!("period={}", period.as_query())),
            _ => None,
        }
    }

    pub fn extra_headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Auth(_) => &[("webapp", "true")],
            Self::Profile => &[("webapp", "false, true")],
            Self::TaskStart(_) | Self::TaskClaim(_) => &[("origin", ORIGIN)],
            _ => &[],
        }
    }

    /// Human-readable operation name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auth(_) => "authenticate",
            Self::Profile => "profile",
            Self::DailyCheckIn => "daily check-in",
            Self::FarmingState => "farming state",
            Self::FarmingStart => "start farming",
            Self::FarmingClaim => "claim farming",
            Self::DiamondState => "diamond state",
            Self::DiamondComplete => "claim diamond",
            Self::GameSettings => "game settings",
            Self::GameSubmit => "submit game result",
            Self::TaskList => "task list",
            Self::TaskStart(_) => "start task",
            Self::TaskClaim(_) => "claim task",
            Self::Leaderboard(_) => "leaderboard",
            Self::GemInventory => "gem inventory",
        }
    }

    pub fn requires_token(&self) -> bool {
        !matches!(self, Self::Auth(_))
    }
}

/// Headers and token for one account pass. Passed into every call; never shared.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HeaderMap,
    token: Option<SessionToken>,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            token: None,
        }
    }

    pub fn with_token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }
}

/// One request, one response. Implementations never retry.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn call(
        &self,
        ctx: &RequestContext,
        endpoint: &Endpoint,
        body: Option<&Value>,
    ) -> Result<Value, NetworkError>;
}

use super::models::{
    AuthResponse, DailyCheckIn, DiamondState, FarmingState, GameResult, GameSettings,
    GemInventory, LeaderboardStanding, Profile, TaskList,
};
use super::{Endpoint, Gateway, LeaderboardPeriod, RequestContext};
use core_logic::{AccountCredential, NetworkError, SessionToken};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

/// Typed operations over a [`Gateway`] bound to one account's context.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<dyn Gateway>,
    ctx: RequestContext,
}

impl ApiClient {
    pub fn new(gateway: Arc<dyn Gateway>, ctx: RequestContext) -> Self {
        Self { gateway, ctx }
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Same gateway and headers, authenticated with `token`.
    pub fn with_token(&self, token: SessionToken) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            ctx: self.ctx.clone().with_token(token),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: Option<Value>,
    ) -> Result<T, NetworkError> {
        let value = self.gateway.call(&self.ctx, &endpoint, body.as_ref()).await?;
        serde_json::from_value(value).map_err(|e| NetworkError::InvalidResponse {
            endpoint: endpoint.name().to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn authenticate(
        &self,
        credential: &AccountCredential,
    ) -> Result<SessionToken, NetworkError> {
        let endpoint = Endpoint::Auth(credential.clone());
        let name = endpoint.name();
        let response: AuthResponse = self.request(endpoint, None).await?;
        response
            .token
            .filter(|t| !t.is_empty())
            .map(SessionToken::new)
            .ok_or_else(|| NetworkError::MissingField {
                endpoint: name.to_string(),
                field: "token".to_string(),
            })
    }

    pub async fn profile(&self) -> Result<Profile, NetworkError> {
        self.request(Endpoint::Profile, None).await
    }

    pub async fn daily_check_in(&self) -> Result<Option<DailyCheckIn>, NetworkError> {
        self.request(Endpoint::DailyCheckIn, None).await
    }

    pub async fn farming_state(&self) -> Result<FarmingState, NetworkError> {
        self.request(Endpoint::FarmingState, None).await
    }

    pub async fn start_farming(&self) -> Result<Option<FarmingState>, NetworkError> {
        self.request(Endpoint::FarmingStart, None).await
    }

    pub async fn claim_farming(&self) -> Result<Value, NetworkError> {
        self.request(Endpoint::FarmingClaim, None).await
    }

    pub async fn diamond_state(&self) -> Result<DiamondState, NetworkError> {
        self.request(Endpoint::DiamondState, None).await
    }

    pub async fn claim_diamond(&self, diamond_number: &str) -> Result<Value, NetworkError> {
        let body = json!({ "diamondNumber": numeric_or_string(diamond_number) });
        self.request(Endpoint::DiamondComplete, Some(body)).await
    }

    pub async fn game_settings(&self) -> Result<GameSettings, NetworkError> {
        self.request(Endpoint::GameSettings, None).await
    }

    pub async fn submit_game(&self, score: u64) -> Result<Option<GameResult>, NetworkError> {
        self.request(Endpoint::GameSubmit, Some(json!({ "score": score })))
            .await
    }

    pub async fn tasks(&self) -> Result<TaskList, NetworkError> {
        self.request(Endpoint::TaskList, None).await
    }

    pub async fn start_task(&self, id: &str) -> Result<Value, NetworkError> {
        self.request(Endpoint::TaskStart(id.to_string()), None).await
    }

    pub async fn claim_task(&self, id: &str) -> Result<Value, NetworkError> {
        self.request(Endpoint::TaskClaim(id.to_string()), None).await
    }

    pub async fn leaderboard(
        &self,
        period: LeaderboardPeriod,
    ) -> Result<LeaderboardStanding, NetworkError> {
        self.request(Endpoint::Leaderboard(period), None).await
    }

    pub async fn gem_inventory(&self) -> Result<GemInventory, NetworkError> {
        self.request(Endpoint::GemInventory, None).await
    }
}

/// Sends ids back in the shape they arrived in.
fn numeric_or_string(raw: &str) -> Value {
    raw.parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}

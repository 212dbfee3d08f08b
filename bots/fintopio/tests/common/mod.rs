#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use core_logic::{AccountCredential, CredentialLoader, NetworkError, SessionToken};
use fintopio_bot::api::{ApiClient, Endpoint, Gateway, RequestContext};
use fintopio_bot::config::FintopioConfig;
use fintopio_bot::subsystem::SubsystemContext;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub type Responder = Box<dyn Fn(&Endpoint, Option<&str>) -> Result<Value, NetworkError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct Call {
    pub endpoint: Endpoint,
    pub token: Option<String>,
    pub body: Option<Value>,
}

/// In-memory gateway that records every call and answers from a closure.
pub struct ScriptedGateway {
    calls: Mutex<Vec<Call>>,
    responder: Responder,
}

impl ScriptedGateway {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&Endpoint, Option<&str>) -> Result<Value, NetworkError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    /// Gateway where every endpoint succeeds with `happy_path`.
    pub fn happy() -> Arc<Self> {
        Self::new(|endpoint, _| Ok(happy_path(endpoint)))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }

    pub fn count(&self, endpoint: &Endpoint) -> usize {
        self.calls().iter().filter(|c| &c.endpoint == endpoint).count()
    }

    /// Calls made with the session token of `credential`.
    pub fn calls_for(&self, credential: &AccountCredential) -> Vec<Call> {
        let token = token_for(credential);
        self.calls()
            .into_iter()
            .filter(|c| c.token.as_deref() == Some(token.as_str()))
            .collect()
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn call(
        &self,
        ctx: &RequestContext,
        endpoint: &Endpoint,
        body: Option<&Value>,
    ) -> Result<Value, NetworkError> {
        let token = ctx.token().map(|t| t.as_str().to_string());
        self.calls.lock().unwrap().push(Call {
            endpoint: endpoint.clone(),
            token: token.clone(),
            body: body.cloned(),
        });
        (self.responder)(endpoint, token.as_deref())
    }
}

pub fn token_for(credential: &AccountCredential) -> String {
    format!("tok-{}", credential.as_str())
}

pub fn millis_from_now(hours: i64) -> i64 {
    (Utc::now() + Duration::hours(hours)).timestamp_millis()
}

pub fn http_error(endpoint: &Endpoint, status_code: u16) -> NetworkError {
    NetworkError::HttpError {
        status_code,
        endpoint: endpoint.name().to_string(),
    }
}

/// Plausible successful answers for every endpoint.
pub fn happy_path(endpoint: &Endpoint) -> Value {
    match endpoint {
        Endpoint::Auth(credential) => json!({ "token": token_for(credential) }),
        Endpoint::Profile => json!({ "balance": "1250.5", "activations": { "used": 1, "total": 5 } }),
        Endpoint::DailyCheckIn => json!({ "dailyReward": 10, "totalDays": 3 }),
        Endpoint::FarmingState => json!({ "state": "farming", "timings": { "finish": millis_from_now(4) } }),
        Endpoint::FarmingStart => json!({ "state": "farming", "timings": { "finish": millis_from_now(8) } }),
        Endpoint::DiamondState => json!({ "state": "unavailable", "timings": { "nextAt": millis_from_now(1) } }),
        Endpoint::GameSettings => json!({ "maxScore": 1000 }),
        Endpoint::GameSubmit => json!({ "actualReward": 5 }),
        Endpoint::TaskList => json!({ "tasks": [] }),
        Endpoint::Leaderboard(_) => json!({ "position": 42, "score": "1250" }),
        Endpoint::GemInventory => json!({ "items": [{ "name": "ruby", "amount": 2 }] }),
        _ => json!({}),
    }
}

pub fn credential(name: &str) -> AccountCredential {
    AccountCredential::new(format!(
        "user=%7B%22first_name%22%3A%22{}%22%7D&hash={}",
        name,
        name.to_lowercase()
    ))
}

pub fn test_config() -> FintopioConfig {
    FintopioConfig::default().without_delays()
}

pub fn context(gateway: Arc<ScriptedGateway>, config: FintopioConfig) -> SubsystemContext {
    let api = ApiClient::new(gateway, RequestContext::default())
        .with_token(SessionToken::new("tok-test"));
    SubsystemContext::new(api, Arc::new(config))
}

/// Loader over a fixed list, or one that always fails.
pub struct StaticLoader {
    accounts: Option<Vec<AccountCredential>>,
}

impl StaticLoader {
    pub fn new(accounts: Vec<AccountCredential>) -> Self {
        Self {
            accounts: Some(accounts),
        }
    }

    pub fn failing() -> Self {
        Self { accounts: None }
    }
}

#[async_trait]
impl CredentialLoader for StaticLoader {
    async fn load_credentials(&self) -> Result<Vec<AccountCredential>> {
        self.accounts
            .clone()
            .ok_or_else(|| anyhow::anyhow!("account list unavailable"))
    }
}

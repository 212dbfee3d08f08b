use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// A string or number field kept as text (balances, rewards, ids).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scalar(pub String);

pub type Amount = Scalar;

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Scalar(s)),
            Value::Number(n) => Ok(Scalar(n.to_string())),
            Value::Bool(b) => Ok(Scalar(b.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display-only fields: a value of the wrong shape reads as absent instead of
/// failing the whole response.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Milliseconds since the epoch, as the API sends them.
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "lenient")]
    pub balance: Option<Amount>,
    #[serde(default, rename = "activations", deserialize_with = "lenient")]
    pub referral_activations: Option<ReferralActivations>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferralActivations {
    #[serde(default, deserialize_with = "lenient")]
    pub used: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<Scalar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyCheckIn {
    #[serde(default, rename = "dailyReward", deserialize_with = "lenient")]
    pub daily_reward: Option<Amount>,
    #[serde(default, rename = "totalDays", deserialize_with = "lenient")]
    pub total_days: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmingPhase {
    Idling,
    Farming,
    Farmed,
    Unknown(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FarmingTimings {
    pub finish: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FarmingState {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub timings: Option<FarmingTimings>,
}

impl FarmingState {
    pub fn phase(&self) -> FarmingPhase {
        match self.state.as_str() {
            "idling" => FarmingPhase::Idling,
            "farming" => FarmingPhase::Farming,
            "farmed" => FarmingPhase::Farmed,
            other => FarmingPhase::Unknown(other.to_string()),
        }
    }

    pub fn finish_at(&self) -> Option<DateTime<Utc>> {
        self.timings
            .as_ref()
            .and_then(|t| t.finish)
            .and_then(from_millis)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiamondSettings {
    #[serde(rename = "totalReward")]
    pub total_reward: Option<Amount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiamondTimings {
    #[serde(rename = "nextAt")]
    pub next_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiamondState {
    pub state: Option<String>,
    #[serde(rename = "diamondNumber")]
    pub diamond_number: Option<Scalar>,
    #[serde(default)]
    pub settings: Option<DiamondSettings>,
    #[serde(default)]
    pub timings: Option<DiamondTimings>,
}

impl DiamondState {
    pub fn next_at(&self) -> Option<DateTime<Utc>> {
        self.timings
            .as_ref()
            .and_then(|t| t.next_at)
            .and_then(from_millis)
    }

    pub fn total_reward(&self) -> Option<&Amount> {
        self.settings.as_ref().and_then(|s| s.total_reward.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameSettings {
    #[serde(rename = "maxScore")]
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameResult {
    #[serde(rename = "actualReward")]
    pub actual_reward: Option<Amount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Available,
    Verified,
    InProgress,
    Other(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskItem {
    pub id: Scalar,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "rewardAmount")]
    pub reward_amount: Option<Amount>,
}

impl TaskItem {
    pub fn status(&self) -> TaskStatus {
        match self.status.as_str() {
            "available" => TaskStatus::Available,
            "verified" => TaskStatus::Verified,
            "in-progress" => TaskStatus::InProgress,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

/// Entries are kept raw so one malformed task cannot hide the others.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub tasks: Vec<Value>,
}

impl TaskList {
    pub fn items(&self) -> impl Iterator<Item = Result<TaskItem, serde_json::Error>> + '_ {
        self.tasks
            .iter()
            .map(|entry| serde_json::from_value(entry.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardStanding {
    #[serde(alias = "rank")]
    pub position: Option<u64>,
    #[serde(alias = "balance")]
    pub score: Option<Amount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GemItem {
    #[serde(alias = "type")]
    pub name: String,
    #[serde(default)]
    pub amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GemInventory {
    #[serde(default, alias = "gems")]
    pub items: Vec<GemItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_accepts_strings_and_numbers() {
        let list: TaskList = serde_json::from_value(json!({
            "tasks": [
                {"id": 7, "slug": "join", "status": "available", "rewardAmount": "250"},
                {"id": "abc", "slug": "follow", "status": "verified", "rewardAmount": 12.5}
            ]
        }))
        .unwrap();
        let tasks: Vec<TaskItem> = list.items().map(Result::unwrap).collect();

        assert_eq!(tasks[0].id.0, "7");
        assert_eq!(tasks[0].status(), TaskStatus::Available);
        assert_eq!(tasks[1].reward_amount.as_ref().unwrap().0, "12.5");
        assert_eq!(tasks[1].status(), TaskStatus::Verified);
    }

    #[test]
    fn test_task_list_keeps_good_entries_next_to_bad_ones() {
        let list: TaskList = serde_json::from_value(json!({
            "tasks": [
                {"slug": "no-id", "status": "available"},
                {"id": 2, "slug": "join-channel", "status": "available"}
            ]
        }))
        .unwrap();

        let items: Vec<_> = list.items().collect();
        assert!(items[0].is_err());
        assert_eq!(items[1].as_ref().unwrap().slug, "join-channel");
    }

    #[test]
    fn test_profile_tolerates_odd_display_fields() {
        let profile: Profile = serde_json::from_value(json!({
            "balance": "10",
            "activations": {"used": "1", "total": [5]}
        }))
        .unwrap();
        assert_eq!(profile.balance.unwrap().0, "10");
        let activations = profile.referral_activations.unwrap();
        assert_eq!(activations.used.unwrap().0, "1");
        assert!(activations.total.is_none());

        let odd: Profile =
            serde_json::from_value(json!({"balance": {"amount": 1}, "activations": "n/a"})).unwrap();
        assert!(odd.balance.is_none());
        assert!(odd.referral_activations.is_none());
    }

    #[test]
    fn test_check_in_tolerates_odd_total_days() {
        let check_in: DailyCheckIn =
            serde_json::from_value(json!({"dailyReward": 10, "totalDays": {"n": 3}})).unwrap();
        assert_eq!(check_in.daily_reward.unwrap().0, "10");
        assert!(check_in.total_days.is_none());
    }

    #[test]
    fn test_farming_state_phases() {
        let state: FarmingState =
            serde_json::from_value(json!({"state": "farmed", "timings": {"finish": 1_700_000_000_000i64}}))
                .unwrap();
        assert_eq!(state.phase(), FarmingPhase::Farmed);
        assert_eq!(state.finish_at().unwrap().timestamp(), 1_700_000_000);

        let unknown: FarmingState = serde_json::from_value(json!({"state": "paused"})).unwrap();
        assert_eq!(unknown.phase(), FarmingPhase::Unknown("paused".to_string()));
        assert!(unknown.finish_at().is_none());
    }

    #[test]
    fn test_diamond_state_without_state_field() {
        let state: DiamondState = serde_json::from_value(json!({"timings": {}})).unwrap();
        assert!(state.state.is_none());
        assert!(state.next_at().is_none());
    }
}

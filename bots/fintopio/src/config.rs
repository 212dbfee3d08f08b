use anyhow::Result;
use config::{Config, Environment, File};
use core_logic::config::{DelayRange, ScheduleConfig};
use core_logic::ConfigError;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://fintopio-tg.fintopio.com/api";

#[derive(Debug, Deserialize, Clone)]
pub struct FintopioConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// One init-data credential per line, reread every pass
    #[serde(default = "default_accounts_file")]
    pub accounts_file: String,
    #[serde(default = "default_user_agents_file")]
    pub user_agents_file: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Tasks whose slug contains any of these (case-insensitive) are never touched
    #[serde(default = "default_excluded_task_slugs")]
    pub excluded_task_slugs: Vec<String>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub farming: FarmingConfig,
    #[serde(default)]
    pub diamond: DiamondConfig,
    #[serde(default)]
    pub game: GameConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FarmingConfig {
    #[serde(default)]
    pub start_delay: DelayRange,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiamondConfig {
    #[serde(default = "default_diamond_claim_delay")]
    pub claim_delay: DelayRange,
}

impl Default for DiamondConfig {
    fn default() -> Self {
        Self {
            claim_delay: default_diamond_claim_delay(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GameConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_min_games")]
    pub min_games: u32,
    #[serde(default = "default_max_games")]
    pub max_games: u32,
    #[serde(default = "default_min_percent")]
    pub min_percent: f64,
    #[serde(default = "default_max_percent")]
    pub max_percent: f64,
    #[serde(default = "default_time_until_play")]
    pub time_until_play: DelayRange,
    #[serde(default = "default_play_duration")]
    pub play_duration: DelayRange,
    #[serde(default = "default_between_rounds")]
    pub between_rounds: DelayRange,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_games: default_min_games(),
            max_games: default_max_games(),
            min_percent: default_min_percent(),
            max_percent: default_max_percent(),
            time_until_play: default_time_until_play(),
            play_duration: default_play_duration(),
            between_rounds: default_between_rounds(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_accounts_file() -> String {
    core_logic::AccountLoader::DEFAULT_FILE.to_string()
}

fn default_user_agents_file() -> String {
    "bots/fintopio/user_agents.txt".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_excluded_task_slugs() -> Vec<String> {
    vec!["boost".to_string()]
}

fn default_diamond_claim_delay() -> DelayRange {
    DelayRange::new(10, 20, 0)
}

fn default_true() -> bool {
    true
}

fn default_min_games() -> u32 {
    1
}

fn default_max_games() -> u32 {
    10
}

fn default_min_percent() -> f64 {
    70.0
}

fn default_max_percent() -> f64 {
    95.0
}

fn default_time_until_play() -> DelayRange {
    DelayRange::new(2, 5, 250)
}

fn default_play_duration() -> DelayRange {
    DelayRange::new(20, 30, 500)
}

fn default_between_rounds() -> DelayRange {
    DelayRange::new(5, 10, 500)
}

impl Default for FintopioConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            accounts_file: default_accounts_file(),
            user_agents_file: default_user_agents_file(),
            request_timeout_secs: default_request_timeout_secs(),
            excluded_task_slugs: default_excluded_task_slugs(),
            schedule: ScheduleConfig::default(),
            farming: FarmingConfig::default(),
            diamond: DiamondConfig::default(),
            game: GameConfig::default(),
        }
    }
}

impl FintopioConfig {
    /// Loads the TOML file at `path`, then applies `FINTOPIO_*` env overrides
    /// (nested keys use `__`, e.g. `FINTOPIO_SCHEDULE__MIN_WAIT_SECS`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("FINTOPIO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("excluded_task_slugs"),
            )
            .build()?;

        let config: Self = settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        self.farming.start_delay.validate("farming.start_delay")?;
        self.diamond.claim_delay.validate("diamond.claim_delay")?;

        let game = &self.game;
        game.time_until_play.validate("game.time_until_play")?;
        game.play_duration.validate("game.play_duration")?;
        game.between_rounds.validate("game.between_rounds")?;

        if game.min_games == 0 || game.min_games > game.max_games {
            return Err(ConfigError::InvalidValue {
                field: "game.min_games".to_string(),
                reason: format!(
                    "expected 1 <= min_games ({}) <= max_games ({})",
                    game.min_games, game.max_games
                ),
            });
        }

        let percent_ok = |p: f64| (0.0..=100.0).contains(&p);
        if !percent_ok(game.min_percent)
            || !percent_ok(game.max_percent)
            || game.min_percent > game.max_percent
        {
            return Err(ConfigError::InvalidValue {
                field: "game.min_percent".to_string(),
                reason: format!(
                    "expected 0 <= min_percent ({}) <= max_percent ({}) <= 100",
                    game.min_percent, game.max_percent
                ),
            });
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// True when the slug falls in an excluded category.
    pub fn is_excluded_task(&self, slug: &str) -> bool {
        let slug = slug.to_lowercase();
        self.excluded_task_slugs
            .iter()
            .filter(|pattern| !pattern.is_empty())
            .any(|pattern| slug.contains(&pattern.to_lowercase()))
    }

    /// Config with every randomized pause disabled.
    pub fn without_delays(mut self) -> Self {
        self.farming.start_delay = DelayRange::ZERO;
        self.diamond.claim_delay = DelayRange::ZERO;
        self.game.time_until_play = DelayRange::ZERO;
        self.game.play_duration = DelayRange::ZERO;
        self.game.between_rounds = DelayRange::ZERO;
        self
    }
}

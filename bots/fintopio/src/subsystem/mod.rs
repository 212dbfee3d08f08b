//! The four reward mechanisms polled for every account.

use crate::api::ApiClient;
use crate::config::FintopioConfig;
use core_logic::DelayRange;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub mod diamond;
pub mod farming;
pub mod game;
pub mod tasks;

pub use self::diamond::DiamondHandler;
pub use self::farming::FarmingHandler;
pub use self::game::GameHandler;
pub use self::tasks::TaskHandler;

pub use core_logic::traits::{Subsystem, SubsystemReport};

/// Everything a handler needs for one account: an authenticated client and
/// the run's configuration.
#[derive(Clone)]
pub struct SubsystemContext {
    pub api: ApiClient,
    pub config: Arc<FintopioConfig>,
}

impl SubsystemContext {
    pub fn new(api: ApiClient, config: Arc<FintopioConfig>) -> Self {
        Self { api, config }
    }
}

/// Sleeps for one draw of `range`, logging the pause first when there is one.
pub(crate) async fn pause(range: &DelayRange, what: &str) -> Duration {
    let delay = range.sample(&mut rand::thread_rng());
    if !delay.is_zero() {
        info!("Waiting {:.1}s before {}", delay.as_secs_f64(), what);
        tokio::time::sleep(delay).await;
    }
    delay
}

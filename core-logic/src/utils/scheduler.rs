use crate::config::ScheduleConfig;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// The only state carried from one pass to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunState {
    /// Next actionable timestamp reported by the first account
    pub next_wake: Option<DateTime<Utc>>,
}

impl RunState {
    /// Overwrites the previous value; `None` clears it.
    pub fn record(&mut self, next_wake: Option<DateTime<Utc>>) {
        self.next_wake = next_wake;
    }

    pub fn reset(&mut self) {
        self.next_wake = None;
    }
}

/// How long to sleep before the next pass. Never below `min_wait`.
pub fn compute_wait(state: &RunState, now: DateTime<Utc>, config: &ScheduleConfig) -> Duration {
    let floor = config.min_wait();
    let wait = match state.next_wake {
        None => config.default_wait(),
        Some(at) => (at - now).to_std().unwrap_or(Duration::ZERO),
    };
    wait.max(floor)
}

use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub passes: u64,
    pub accounts: AccountMetrics,
    pub subsystems: SubsystemMetrics,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountMetrics {
    pub processed: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubsystemMetrics {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub success_rate: f64,
}

/// Running totals across all passes of one process.
#[derive(Debug)]
pub struct MetricsCollector {
    passes: AtomicU64,
    accounts_processed: AtomicU64,
    accounts_skipped: AtomicU64,
    subsystems_success: AtomicU64,
    subsystems_failed: AtomicU64,
    last_pass_ms: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            passes: AtomicU64::new(0),
            accounts_processed: AtomicU64::new(0),
            accounts_skipped: AtomicU64::new(0),
            subsystems_success: AtomicU64::new(0),
            subsystems_failed: AtomicU64::new(0),
            last_pass_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account went through every step (subsystems may still have failed)
    pub fn record_account_processed(&self) {
        self.accounts_processed.fetch_add(1, Ordering::SeqCst);
    }

    /// Account was abandoned at authentication or profile
    pub fn record_account_skipped(&self) {
        self.accounts_skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_subsystem(&self, success: bool) {
        if success {
            self.subsystems_success.fetch_add(1, Ordering::SeqCst);
        } else {
            self.subsystems_failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn record_pass(&self, duration: Duration) {
        self.passes.fetch_add(1, Ordering::SeqCst);
        self.last_pass_ms
            .store(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn last_pass_duration(&self) -> Duration {
        Duration::from_millis(self.last_pass_ms.load(Ordering::SeqCst))
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let success = self.subsystems_success.load(Ordering::SeqCst);
        let failed = self.subsystems_failed.load(Ordering::SeqCst);
        let total = success + failed;

        MetricsSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            passes: self.passes.load(Ordering::SeqCst),
            accounts: AccountMetrics {
                processed: self.accounts_processed.load(Ordering::SeqCst),
                skipped: self.accounts_skipped.load(Ordering::SeqCst),
            },
            subsystems: SubsystemMetrics {
                total,
                success,
                failed,
                success_rate: if total > 0 {
                    (success as f64 / total as f64) * 100.0
                } else {
                    0.0
                },
            },
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

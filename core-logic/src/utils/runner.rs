use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct WorkerRunner;

impl WorkerRunner {
    /// Returns a token that is cancelled on Ctrl+C.
    pub fn shutdown_token() -> CancellationToken {
        let token = CancellationToken::new();
        let cloned_token = token.clone();

        // Spawn a task to listen for Ctrl+C
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("🛑 Received Ctrl+C. Initiating graceful shutdown...");
                    cloned_token.cancel();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        });

        token
    }
}

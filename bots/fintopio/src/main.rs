use fintopio_bot::api::HttpGateway;
use fintopio_bot::{AccountOrchestrator, BotRunner, FintopioConfig, IdentityProvider};

use anyhow::{Context, Result};
use clap::Parser;
use core_logic::{setup_logger, setup_logger_with_file, AccountLoader, WorkerRunner};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "bots/fintopio/config.toml")]
    config: String,
    /// Overrides `accounts_file` from the config
    #[arg(short, long)]
    accounts: Option<String>,
    /// Run a single pass and exit
    #[arg(long)]
    once: bool,
    /// Log to this file instead of the daily rolling log
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = match &args.log_file {
        Some(path) => Some(setup_logger_with_file(path)?),
        None => setup_logger(),
    };
    dotenv().ok();

    info!("Loading config from: {}", args.config);
    let mut config = match FintopioConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return Err(e);
        }
    };
    if let Some(accounts) = args.accounts {
        config.accounts_file = accounts;
    }

    let identities = IdentityProvider::from_file(&config.user_agents_file)
        .with_context(|| format!("Failed to load user agents from {}", config.user_agents_file))?;
    info!("Loaded {} user agents", identities.corpus_size());

    let gateway = HttpGateway::new(&config.base_url, config.request_timeout())?;
    let loader = AccountLoader::new(&config.accounts_file);
    info!("Reading accounts from {}", loader.path().display());

    let orchestrator = AccountOrchestrator::new(Arc::new(gateway), Arc::new(config));
    let mut runner = BotRunner::new(Box::new(loader), orchestrator, identities);

    let token = WorkerRunner::shutdown_token();
    if let Err(e) = runner.run(token, args.once).await {
        error!("Fatal error: {:#}", e);
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}

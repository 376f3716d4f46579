use std::process::ExitCode;

use anyhow::Result;
use block_notifier::{config::Config, logging, notifier, pool_client, stopper, telegram_client};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = Config::parse();
    logging::setup(config.log_format);
    info!("Starting block notifier for {}", config.coin);
    let pool = pool_client::Client::new_from_config(&config)?;
    let telegram = telegram_client::Client::new_from_config(&config)?;
    let cancel_token = CancellationToken::new();
    let stopper_handle = stopper::run(cancel_token.clone());

    let result = notifier::run(&config, pool, telegram, cancel_token.clone()).await;
    cancel_token.cancel();
    if let Err(e) = stopper_handle.await {
        error!("Stopper task failed: {}", e);
    }

    match result {
        Ok(()) => {
            info!("Goodbye.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

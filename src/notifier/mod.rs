use std::time::Duration;

use tokio::{select, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    block::BlockRecord, config::Config, pool_client::StatsSource, telegram_client::Messenger,
};

pub mod error;

pub use error::{SendError, StartupError};

/// Outcome of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Notified { height: i64 },
    SendFailed { height: i64 },
    Unchanged { height: i64 },
    FetchFailed,
}

pub fn format_message(block: &BlockRecord) -> String {
    format!(
        "New block found.\nCoin: {}\nHeight: {}\nTimestamp: {}\nFinder: {}",
        block.coin, block.height, block.timestamp, block.finder
    )
}

pub struct Notifier<S, M> {
    source: S,
    messenger: M,
    chat_id: i64,
    // None until the first block is seen, so the first successful fetch always announces.
    last_height: Option<i64>,
}

impl<S: StatsSource, M: Messenger> Notifier<S, M> {
    /// Resolves the destination channel once. There is no retry: without a
    /// destination the loop has nothing to do.
    pub async fn start(source: S, messenger: M, channel: &str) -> Result<Self, StartupError> {
        let chat_id = messenger.resolve_channel(channel).await.map_err(|source| {
            StartupError::ResolveChannel {
                channel: channel.to_string(),
                source,
            }
        })?;
        info!("Resolved channel {} to chat id {}", channel, chat_id);

        Ok(Notifier {
            source,
            messenger,
            chat_id,
            last_height: None,
        })
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn last_height(&self) -> Option<i64> {
        self.last_height
    }

    pub async fn announce(&self, block: &BlockRecord) -> Result<(), SendError> {
        self.messenger
            .send_text(self.chat_id, &format_message(block))
            .await
            .map_err(|source| SendError {
                height: block.height,
                source,
            })
    }

    pub async fn poll_once(&mut self) -> Cycle {
        let block = match self.source.fetch_latest_block().await {
            Ok(block) => block,
            Err(e) => {
                warn!("Error fetching pool statistics: {}", e);
                return Cycle::FetchFailed;
            }
        };

        let height = block.height;
        if self.last_height == Some(height) {
            debug!("Block {} already announced", height);
            return Cycle::Unchanged { height };
        }

        // Committed before sending: a failed delivery is not retried on the next poll.
        self.last_height = Some(height);
        match self.announce(&block).await {
            Ok(()) => {
                info!("Announced block {} {} found by {}", height, block.hash, block.finder);
                Cycle::Notified { height }
            }
            Err(e) => {
                error!("{}", e);
                Cycle::SendFailed { height }
            }
        }
    }

    pub async fn run(mut self, interval: Duration, cancel_token: CancellationToken) {
        loop {
            select! {
                _ = cancel_token.cancelled() => {
                    info!("Notifier cancelled");
                    break;
                }
                _ = self.poll_once() => {}
            }

            select! {
                _ = cancel_token.cancelled() => {
                    info!("Notifier cancelled");
                    break;
                }
                _ = sleep(interval) => {}
            }
        }

        info!("Notifier exited");
    }
}

pub async fn run<S: StatsSource, M: Messenger>(
    config: &Config,
    source: S,
    messenger: M,
    cancel_token: CancellationToken,
) -> Result<(), StartupError> {
    let notifier = Notifier::start(source, messenger, &config.channel).await?;
    notifier.run(config.poll_interval(), cancel_token).await;
    Ok(())
}

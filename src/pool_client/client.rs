use std::time::Duration;

use chrono::FixedOffset;
use reqwest::{Client as HttpClient, ClientBuilder, header::HeaderMap};

use crate::{block::BlockRecord, config::Config};

use super::{error::FetchError, types::PoolStats};

#[derive(Clone, Debug)]
pub struct Client {
    client: HttpClient,
    url: String,
    coin: String,
    offset: FixedOffset,
}

impl Client {
    pub fn new(
        url: String,
        coin: String,
        offset: FixedOffset,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .default_headers({
                let mut headers = HeaderMap::new();
                headers.insert(
                    "Accept",
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .timeout(timeout)
            .build()?;

        Ok(Client {
            client,
            url,
            coin,
            offset,
        })
    }

    pub fn new_from_config(config: &Config) -> Result<Self, FetchError> {
        Client::new(
            config.stats_url.clone(),
            config.coin.clone(),
            config.utc_offset,
            config.fetch_timeout(),
        )
    }

    pub async fn get_pool_stats(&self) -> Result<PoolStats, FetchError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        PoolStats::from_slice(&body)
    }

    pub async fn fetch(&self) -> Result<BlockRecord, FetchError> {
        self.get_pool_stats()
            .await?
            .into_block_record(&self.coin, self.offset)
    }
}

pub trait StatsSource: Send + Sync + 'static {
    fn fetch_latest_block(&self) -> impl Future<Output = Result<BlockRecord, FetchError>> + Send;
}

impl StatsSource for Client {
    async fn fetch_latest_block(&self) -> Result<BlockRecord, FetchError> {
        self.fetch().await
    }
}

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use crate::{
    block::BlockRecord,
    pool_client::{FetchError, StatsSource},
    telegram_client::{self, Messenger},
};

pub fn new_block(height: i64) -> BlockRecord {
    BlockRecord {
        hash: format!("0x{:064x}", height),
        finder: "0xfinder".to_string(),
        coin: "ETC-SOLO".to_string(),
        height,
        timestamp: "14/11/2023, 22:13:20".to_string(),
    }
}

/// Replays queued fetch results, then reports no matured blocks.
#[derive(Clone, Default)]
pub struct MockStatsSource {
    responses: Arc<Mutex<VecDeque<Result<BlockRecord, FetchError>>>>,
    fetches: Arc<Mutex<usize>>,
}

impl MockStatsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<BlockRecord, FetchError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_block(&self, height: i64) {
        self.push(Ok(new_block(height)));
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

impl StatsSource for MockStatsSource {
    async fn fetch_latest_block(&self) -> Result<BlockRecord, FetchError> {
        *self.fetches.lock().unwrap() += 1;
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::NoMaturedBlocks))
    }
}

/// Records sent messages. Resolution fails when no chat id is set and sends
/// fail while `failing_sends` is non-zero.
#[derive(Clone, Default)]
pub struct MockMessenger {
    chat_id: Option<i64>,
    sent: Arc<Mutex<Vec<(i64, String)>>>,
    failing_sends: Arc<Mutex<usize>>,
}

impl MockMessenger {
    pub fn new(chat_id: i64) -> Self {
        MockMessenger {
            chat_id: Some(chat_id),
            ..Default::default()
        }
    }

    pub fn unresolvable() -> Self {
        Self::default()
    }

    pub fn fail_next_sends(&self, n: usize) {
        *self.failing_sends.lock().unwrap() = n;
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Messenger for MockMessenger {
    async fn resolve_channel(&self, _name: &str) -> Result<i64, telegram_client::Error> {
        self.chat_id.ok_or(telegram_client::Error::Api {
            code: 400,
            description: "Bad Request: chat not found".to_string(),
        })
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), telegram_client::Error> {
        {
            let mut failing = self.failing_sends.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(telegram_client::Error::Api {
                    code: 429,
                    description: "Too Many Requests: retry after 5".to_string(),
                });
            }
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

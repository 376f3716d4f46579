use thiserror::Error as ThisError;

use crate::telegram_client;

#[derive(ThisError, Debug)]
pub enum StartupError {
    #[error("Failed to resolve channel {channel}: {source}")]
    ResolveChannel {
        channel: String,
        #[source]
        source: telegram_client::Error,
    },
}

#[derive(ThisError, Debug)]
#[error("Failed to announce block {height}: {source}")]
pub struct SendError {
    pub height: i64,
    #[source]
    pub source: telegram_client::Error,
}

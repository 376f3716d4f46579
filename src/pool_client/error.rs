use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("JSON deserialization failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("No matured block data found in the response")]
    NoMaturedBlocks,
    #[error("Missing or malformed field in matured block: {0}")]
    MalformedField(&'static str),
}

use chrono::{DateTime, FixedOffset};

pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// The latest matured block reported by the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRecord {
    pub hash: String,
    pub finder: String,
    pub coin: String,
    pub height: i64,
    /// Already rendered with [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
}

/// Renders unix seconds as `DD/MM/YYYY, HH:MM:SS` at the given offset.
pub fn format_timestamp(unix_secs: i64, offset: FixedOffset) -> Option<String> {
    let utc = DateTime::from_timestamp(unix_secs, 0)?;
    Some(utc.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string())
}

use std::time::Duration;

use chrono::FixedOffset;
use clap::Parser;

use crate::logging;

#[derive(Debug, Clone, Parser)]
#[clap(
    version = "0.1.0",
    about = "Block notifier",
    long_about = r#"Polls a mining pool statistics endpoint and announces newly matured blocks to a Telegram channel"#
)]
pub struct Config {
    #[clap(
        long,
        env = "LOG_FORMAT",
        help = "Log format (plain, json)",
        default_value = "plain"
    )]
    pub log_format: logging::Format,

    #[clap(
        long,
        env = "STATS_URL",
        help = "URL of the pool blocks endpoint (e.g., https://pool.example.org/api/blocks)"
    )]
    pub stats_url: String,

    #[clap(
        long,
        env = "TELEGRAM_BOT_TOKEN",
        help = "Token used to authenticate against the Telegram Bot API",
        hide_env_values = true
    )]
    pub telegram_bot_token: String,

    #[clap(
        long,
        env = "TELEGRAM_API_URL",
        help = "Base URL of the Telegram Bot API",
        default_value = "https://api.telegram.org"
    )]
    pub telegram_api_url: String,

    #[clap(
        long,
        env = "CHANNEL",
        help = "Channel that receives block announcements (e.g., @username)"
    )]
    pub channel: String,

    #[clap(
        long,
        env = "COIN",
        help = "Coin label printed in announcements",
        default_value = "ETC-SOLO"
    )]
    pub coin: String,

    #[clap(
        long,
        env = "POLL_INTERVAL_SECS",
        help = "Seconds to wait between two polls of the stats endpoint",
        default_value = "600",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,

    #[clap(
        long,
        env = "FETCH_TIMEOUT_SECS",
        help = "Timeout in seconds for a single request to the stats endpoint or the Telegram API",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fetch_timeout_secs: u64,

    #[clap(
        long,
        env = "UTC_OFFSET",
        help = "Fixed UTC offset used to render block timestamps (e.g., +02:00)",
        default_value = "+00:00",
        value_parser = parse_utc_offset
    )]
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Bound for Bot API calls; shares the fetch timeout so one cycle never stalls.
    pub fn request_timeout(&self) -> Duration {
        self.fetch_timeout()
    }
}

/// Parses `Z`, `+HH:MM` or `-HH:MM` into a fixed offset east of UTC.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, String> {
    let s = s.trim();
    let s = if s.eq_ignore_ascii_case("z") { "+00:00" } else { s };

    let invalid = || format!("invalid UTC offset {:?}, expected +HH:MM or -HH:MM", s);
    let (sign, rest) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

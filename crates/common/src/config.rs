use serde::Deserialize;

use crate::types::ChatId;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Telegram bot token used for notification delivery
    pub telegram_bot_token: String,

    /// Base URL of the TestFlight site the join pages live under
    pub testflight_url: String,

    /// Polling interval in milliseconds (default: 1800000 = 30 min)
    pub check_interval_ms: u64,

    /// Delay before the first sweep after startup (default: 5000)
    pub startup_delay_ms: u64,

    /// Per-request fetch timeout in seconds (default: 15)
    pub fetch_timeout_secs: u64,

    /// Fixed destination chat for the broadcast deployment
    pub broadcast_chat_id: Option<ChatId>,

    /// Pre-seeded beta codes for the broadcast deployment (comma-separated)
    pub beta_codes: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .map_err(|_| anyhow::anyhow!("TELEGRAM_BOT_TOKEN environment variable is required"))?,
            testflight_url: std::env::var("TESTFLIGHT_URL")
                .unwrap_or_else(|_| "https://testflight.apple.com".to_string()),
            check_interval_ms: std::env::var("CHECK_INTERVAL_MS")
                .unwrap_or_else(|_| "1800000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CHECK_INTERVAL_MS must be a valid u64"))?,
            startup_delay_ms: std::env::var("STARTUP_DELAY_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("STARTUP_DELAY_MS must be a valid u64"))?,
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("FETCH_TIMEOUT_SECS must be a valid u64"))?,
            broadcast_chat_id: match std::env::var("BROADCAST_CHAT_ID") {
                Ok(raw) => Some(
                    raw.parse()
                        .map_err(|_| anyhow::anyhow!("BROADCAST_CHAT_ID must be a valid i64"))?,
                ),
                Err(_) => None,
            },
            beta_codes: std::env::var("BETA_CODES")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

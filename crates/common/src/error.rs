use thiserror::Error;

use crate::types::ChatId;

/// Failure classification for one beta page fetch.
///
/// The cycle driver catches these per code. There is no retry within a
/// cycle; the next scheduled cycle is the retry mechanism.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("network error: {0}")]
    Network(String),
}

/// Per-destination delivery failure. Logged by the cycle driver and never
/// fatal: remaining destinations still receive their notification.
#[derive(Debug, Error)]
#[error("delivery to chat {chat_id} failed: {reason}")]
pub struct DispatchError {
    pub chat_id: ChatId,
    pub reason: String,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chat destination identifier for notification delivery.
pub type ChatId = i64;

/// App name sentinel used until a page yields a real title.
pub const UNKNOWN_APP: &str = "Unknown App";

/// Observed enrollment state of a tracked beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetaStatus {
    /// No completed check cycle yet.
    Unchecked,
    /// The beta has open slots and can be joined.
    Available,
    /// The beta is at capacity.
    Full,
    /// The page was fetched but no status rule matched.
    Unknown,
    /// The last fetch attempt failed.
    Error,
}

impl std::fmt::Display for BetaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetaStatus::Unchecked => write!(f, "unchecked"),
            BetaStatus::Available => write!(f, "available"),
            BetaStatus::Full => write!(f, "full"),
            BetaStatus::Unknown => write!(f, "unknown"),
            BetaStatus::Error => write!(f, "error"),
        }
    }
}

/// Version info extracted from a "Version X (Build Y)" page pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetaVersion {
    pub version: String,
    pub build: String,
}

impl std::fmt::Display for BetaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (Build {})", self.version, self.build)
    }
}

/// Structured snapshot extracted from one beta page fetch.
///
/// Extraction never produces `Unchecked` or `Error`; those states belong to
/// the registry record, not the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedStatus {
    pub code: String,
    pub status: BetaStatus,
    pub app_name: String,
    pub icon_url: Option<String>,
    pub description: String,
    pub version: Option<BetaVersion>,
    pub screenshots: Vec<String>,
}

/// One tracked beta code with its last observed state and interested chats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetaRecord {
    pub code: String,
    pub status: BetaStatus,
    pub app_name: String,
    pub version: Option<BetaVersion>,
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Chats to notify when this beta opens up. Empty in broadcast
    /// deployments, where one fixed destination receives everything.
    pub subscribers: Vec<ChatId>,
}

impl BetaRecord {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            status: BetaStatus::Unchecked,
            app_name: UNKNOWN_APP.to_string(),
            version: None,
            last_checked_at: None,
            subscribers: Vec::new(),
        }
    }
}

/// Rendered notification ready for delivery to one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Markdown-formatted message body.
    pub text: String,
    /// App icon, attached as the lead photo when present.
    pub icon_url: Option<String>,
    /// Screenshot URLs sent after the main message.
    pub screenshots: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_lowercase() {
        assert_eq!(BetaStatus::Available.to_string(), "available");
        assert_eq!(BetaStatus::Full.to_string(), "full");
        assert_eq!(BetaStatus::Unchecked.to_string(), "unchecked");
    }

    #[test]
    fn test_version_display() {
        let v = BetaVersion {
            version: "2.1".to_string(),
            build: "37".to_string(),
        };
        assert_eq!(v.to_string(), "2.1 (Build 37)");
    }

    #[test]
    fn test_new_record_starts_unchecked() {
        let rec = BetaRecord::new("abcd1234");
        assert_eq!(rec.status, BetaStatus::Unchecked);
        assert_eq!(rec.app_name, UNKNOWN_APP);
        assert!(rec.version.is_none());
        assert!(rec.last_checked_at.is_none());
        assert!(rec.subscribers.is_empty());
    }
}

//! Operations the chat-command collaborator invokes.
//!
//! The command layer owns the registry, page source and extractor and
//! passes them in; nothing here holds state, which keeps every operation
//! directly callable from tests.

use chrono::Utc;

use betawatch_common::error::FetchError;
use betawatch_common::ports::PageSource;
use betawatch_common::types::{
    BetaRecord, BetaStatus, BetaVersion, ChatId, ExtractedStatus, UNKNOWN_APP,
};
use betawatch_extractor::StatusExtractor;

use crate::registry::MonitorRegistry;

pub struct MonitorService;

impl MonitorService {
    /// One-off check of a code without touching the registry.
    pub async fn check_once<S: PageSource>(
        source: &S,
        extractor: &StatusExtractor,
        code: &str,
    ) -> Result<ExtractedStatus, FetchError> {
        let page = source.fetch(code).await?;
        Ok(extractor.extract(&page, code))
    }

    /// Start monitoring a code for a chat.
    ///
    /// Performs an initial check so the scheduled cycle has a baseline to
    /// diff against. A failed fetch still registers the code (with status
    /// `Error`); the next cycle retries. Returns a record snapshot for the
    /// confirmation message.
    pub async fn subscribe<S: PageSource>(
        source: &S,
        extractor: &StatusExtractor,
        registry: &mut MonitorRegistry,
        code: &str,
        chat_id: ChatId,
    ) -> BetaRecord {
        match Self::check_once(source, extractor, code).await {
            Ok(extracted) => {
                registry.upsert(code, |record| {
                    record.status = extracted.status;
                    record.last_checked_at = Some(Utc::now());
                    if extracted.app_name != UNKNOWN_APP {
                        record.app_name = extracted.app_name.clone();
                    }
                    if let Some(version) = &extracted.version {
                        record.version = Some(version.clone());
                    }
                });
            }
            Err(e) => {
                tracing::warn!(code, error = %e, "Initial check failed; registering anyway");
                registry.upsert(code, |record| {
                    record.status = BetaStatus::Error;
                    record.last_checked_at = Some(Utc::now());
                });
            }
        }

        if registry.add_subscriber(code, chat_id) {
            tracing::info!(code, chat_id, "Subscription added");
        }

        registry
            .get(code)
            .cloned()
            .unwrap_or_else(|| BetaRecord::new(code))
    }

    /// Stop monitoring a code for a chat. Returns `false` when the chat was
    /// not subscribed.
    pub fn unsubscribe(registry: &mut MonitorRegistry, code: &str, chat_id: ChatId) -> bool {
        let removed = registry.remove_subscriber(code, chat_id);
        if removed {
            tracing::info!(code, chat_id, "Subscription removed");
        }
        removed
    }

    /// Records the chat is currently subscribed to, for display.
    pub fn subscriptions_for(registry: &MonitorRegistry, chat_id: ChatId) -> Vec<BetaRecord> {
        registry.subscribed_to(chat_id)
    }

    /// Version info for a code, when the page exposes it.
    pub async fn list_version<S: PageSource>(
        source: &S,
        extractor: &StatusExtractor,
        code: &str,
    ) -> Result<Option<BetaVersion>, FetchError> {
        Ok(Self::check_once(source, extractor, code).await?.version)
    }

    /// App name plus up to five screenshot URLs for a code.
    pub async fn list_screenshots<S: PageSource>(
        source: &S,
        extractor: &StatusExtractor,
        code: &str,
    ) -> Result<(String, Vec<String>), FetchError> {
        let extracted = Self::check_once(source, extractor, code).await?;
        Ok((extracted.app_name, extracted.screenshots))
    }
}

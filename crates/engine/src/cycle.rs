//! Check-cycle driver: fetch → extract → diff → notify, one code at a time.
//!
//! Codes are processed strictly sequentially with an inter-code delay to
//! respect informal upstream rate limits. Fetch and delivery failures are
//! contained per code / per destination and never abort the cycle.

use std::time::Duration;

use chrono::Utc;

use betawatch_common::ports::{Notifier, PageSource};
use betawatch_common::types::{
    BetaStatus, ChatId, ExtractedStatus, NotificationPayload, UNKNOWN_APP,
};
use betawatch_extractor::StatusExtractor;

use crate::registry::MonitorRegistry;

/// Delay between codes when each code fans out to its own subscribers.
pub const SUBSCRIBER_CODE_DELAY: Duration = Duration::from_secs(2);

/// Delay between codes when everything goes to one broadcast chat.
pub const BROADCAST_CODE_DELAY: Duration = Duration::from_secs(5);

/// Screenshots attached to a scheduled availability notification. The full
/// set stays reachable through the on-demand listing operation.
const NOTIFY_SCREENSHOTS: usize = 1;

/// How notifications fan out when a beta opens up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Notify every chat subscribed to the code (chat-bot deployment).
    Subscribers,
    /// Notify one fixed chat for every code (channel deployment).
    Broadcast(ChatId),
}

/// Outcome counts for one completed cycle, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub transitions: usize,
    pub notified: usize,
    pub errors: usize,
}

/// Drives one full pass over the registry.
pub struct CycleDriver<S, N> {
    source: S,
    extractor: StatusExtractor,
    notifier: N,
    mode: DispatchMode,
    join_base_url: String,
    inter_code_delay: Duration,
}

impl<S: PageSource, N: Notifier> CycleDriver<S, N> {
    pub fn new(source: S, notifier: N, mode: DispatchMode, join_base_url: impl Into<String>) -> Self {
        let inter_code_delay = match mode {
            DispatchMode::Subscribers => SUBSCRIBER_CODE_DELAY,
            DispatchMode::Broadcast(_) => BROADCAST_CODE_DELAY,
        };
        Self {
            source,
            extractor: StatusExtractor::new(),
            notifier,
            mode,
            join_base_url: join_base_url.into(),
            inter_code_delay,
        }
    }

    /// Override the inter-code delay (tests use `Duration::ZERO`).
    pub fn with_inter_code_delay(mut self, delay: Duration) -> Self {
        self.inter_code_delay = delay;
        self
    }

    /// Walk every registered code once, in insertion order.
    pub async fn run_cycle_once(&self, registry: &mut MonitorRegistry) -> CycleReport {
        let codes = registry.all_codes();
        tracing::info!(count = codes.len(), "Checking monitored betas");

        let mut report = CycleReport::default();
        for (i, code) in codes.iter().enumerate() {
            self.check_code(code, registry, &mut report).await;
            if i + 1 < codes.len() && !self.inter_code_delay.is_zero() {
                tokio::time::sleep(self.inter_code_delay).await;
            }
        }

        tracing::info!(
            checked = report.checked,
            transitions = report.transitions,
            notified = report.notified,
            errors = report.errors,
            "Check cycle complete"
        );
        report
    }

    async fn check_code(&self, code: &str, registry: &mut MonitorRegistry, report: &mut CycleReport) {
        report.checked += 1;

        let page = match self.source.fetch(code).await {
            Ok(page) => page,
            Err(e) => {
                report.errors += 1;
                tracing::warn!(code, error = %e, "Fetch failed; next cycle will retry");
                // Broadcast deployments leave the record untouched so the
                // next cycle still compares against the last real status.
                if self.mode == DispatchMode::Subscribers {
                    registry.upsert(code, |record| {
                        record.status = BetaStatus::Error;
                        record.last_checked_at = Some(Utc::now());
                    });
                }
                return;
            }
        };

        let extracted = self.extractor.extract(&page, code);
        let previous = registry
            .get(code)
            .map(|record| record.status)
            .unwrap_or(BetaStatus::Unchecked);

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

        if !should_notify(previous, extracted.status) {
            return;
        }
        report.transitions += 1;

        let destinations: Vec<ChatId> = match &self.mode {
            DispatchMode::Subscribers => registry
                .get(code)
                .map(|record| record.subscribers.clone())
                .unwrap_or_default(),
            DispatchMode::Broadcast(chat_id) => vec![*chat_id],
        };

        tracing::info!(
            code,
            app_name = %extracted.app_name,
            previous = %previous,
            destinations = destinations.len(),
            "Beta now available, sending notifications"
        );

        let payload = render_available(&extracted, &join_url(&self.join_base_url, code));
        for chat_id in destinations {
            match self.notifier.send(chat_id, &payload).await {
                Ok(()) => report.notified += 1,
                Err(e) => {
                    tracing::warn!(code, chat_id, error = %e, "Notification delivery failed");
                }
            }
        }
    }
}

/// Edge-triggered change detection: fire only at the moment a beta becomes
/// available. No fire while it stays available, and none on transitions
/// into `Full`/`Unknown`/`Error`.
pub fn should_notify(previous: BetaStatus, current: BetaStatus) -> bool {
    previous != BetaStatus::Available && current == BetaStatus::Available
}

/// Public join-page URL for a beta code.
pub fn join_url(base_url: &str, code: &str) -> String {
    format!("{}/join/{}", base_url.trim_end_matches('/'), code)
}

/// Render the "now available" notification for one extraction.
pub fn render_available(extracted: &ExtractedStatus, join_url: &str) -> NotificationPayload {
    let mut text = format!(
        "🎉 *GOOD NEWS!* Beta *{}* is now AVAILABLE!\n\n",
        extracted.app_name
    );
    if !extracted.description.is_empty() {
        text.push_str(&extracted.description);
        text.push_str("\n\n");
    }
    if let Some(version) = &extracted.version {
        text.push_str(&format!("*Version:* {version}\n\n"));
    }
    text.push_str("*How to join:*\n");
    text.push_str("1. Install the TestFlight app from the App Store\n");
    text.push_str(&format!("2. Open: {join_url}\n\n"));
    text.push_str(&format!("Code: `{}`", extracted.code));

    NotificationPayload {
        text,
        icon_url: extracted.icon_url.clone(),
        screenshots: extracted
            .screenshots
            .iter()
            .take(NOTIFY_SCREENSHOTS)
            .cloned()
            .collect(),
    }
}

//! Best-effort pattern extraction over raw TestFlight join-page text.
//!
//! The markers below are an informal contract with the upstream markup, not
//! a grammar: when Apple changes the page, rules quietly stop matching and
//! the status decision falls back to `Unknown` rather than erroring. Keeping
//! every rule in this one type means the matching strategy can be swapped
//! (e.g., for a structured HTML parser) without touching the cycle driver.

use regex::Regex;

use betawatch_common::types::{BetaStatus, BetaVersion, ExtractedStatus, UNKNOWN_APP};

#[cfg(test)]
mod extractor_tests;

/// Literal marker for a beta at capacity. Checked before any join affordance.
const FULL_MARKER: &str = "This beta is full.";

/// Any of these indicates the beta still accepts testers.
const JOIN_MARKERS: &[&str] = &[
    "View in TestFlight",
    "To join the",
    "open the link on your iPhone",
    "Step 2",
];

/// Asset markers identifying icon renditions rather than screenshots.
const NON_SCREENSHOT_MARKERS: &[&str] = &["Icon-Production", "Prod-0-0-1x_U007ephone"];

/// Maximum screenshot URLs kept per extraction.
pub const MAX_SCREENSHOTS: usize = 5;

/// Description length cap before the ellipsis is appended.
const MAX_DESCRIPTION_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

/// Pattern rules for turning page text into an [`ExtractedStatus`].
///
/// All patterns are compiled once at construction; [`extract`] itself is a
/// pure function of the page text.
///
/// [`extract`]: StatusExtractor::extract
pub struct StatusExtractor {
    title: Regex,
    icon: Regex,
    description: Regex,
    version: Regex,
    screenshot: Regex,
    markup: Regex,
}

impl StatusExtractor {
    pub fn new() -> Self {
        Self {
            title: Regex::new(r"<title>Join the (.*?) beta - TestFlight - Apple</title>")
                .expect("valid title pattern"),
            icon: Regex::new(
                r"background-image: url\((https://is\d+-ssl\.mzstatic\.com/image/thumb/[^)]+)\)",
            )
            .expect("valid icon pattern"),
            description: Regex::new(r#"(?s)<p class="step3">(.*?)</p>"#)
                .expect("valid description pattern"),
            version: Regex::new(r"Version ([0-9.]+) \(Build ([0-9.]+)\)")
                .expect("valid version pattern"),
            screenshot: Regex::new(
                r"image:\s*url\((https://is\d+-ssl\.mzstatic\.com/image/thumb/[^)]+)\)",
            )
            .expect("valid screenshot pattern"),
            markup: Regex::new(r"<[^>]+>").expect("valid markup pattern"),
        }
    }

    /// Extract the structured status snapshot for one beta page.
    pub fn extract(&self, page: &str, code: &str) -> ExtractedStatus {
        let app_name = self
            .title
            .captures(page)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| UNKNOWN_APP.to_string());

        let icon_url = self.icon.captures(page).map(|c| c[1].to_string());

        let version = self.version.captures(page).map(|c| BetaVersion {
            version: c[1].to_string(),
            build: c[2].to_string(),
        });

        let status = Self::decide_status(page);

        tracing::debug!(code, status = %status, app_name = %app_name, "Extracted beta status");

        ExtractedStatus {
            code: code.to_string(),
            status,
            app_name,
            icon_url,
            description: self.page_description(page),
            version,
            screenshots: self.page_screenshots(page),
        }
    }

    /// Three-way status decision, ordered rules, first match wins.
    ///
    /// The full-marker takes precedence: a page advertising both capacity
    /// and join affordances is still `Full`.
    pub fn decide_status(page: &str) -> BetaStatus {
        if page.contains(FULL_MARKER) {
            return BetaStatus::Full;
        }
        if JOIN_MARKERS.iter().any(|m| page.contains(m)) {
            return BetaStatus::Available;
        }
        BetaStatus::Unknown
    }

    fn page_description(&self, page: &str) -> String {
        let raw = match self.description.captures(page) {
            Some(c) => c[1].to_string(),
            None => return String::new(),
        };
        let stripped = self.markup.replace_all(&raw, "");
        Self::truncate_description(stripped.trim())
    }

    /// Cap at [`MAX_DESCRIPTION_CHARS`] characters plus a trailing ellipsis.
    fn truncate_description(text: &str) -> String {
        if text.chars().count() <= MAX_DESCRIPTION_CHARS {
            return text.to_string();
        }
        let mut out: String = text.chars().take(MAX_DESCRIPTION_CHARS).collect();
        out.push_str(ELLIPSIS);
        out
    }

    /// All screenshot URLs from inline `image: url(...)` declarations,
    /// excluding icon production assets, capped at [`MAX_SCREENSHOTS`].
    fn page_screenshots(&self, page: &str) -> Vec<String> {
        self.screenshot
            .captures_iter(page)
            .map(|c| c[1].to_string())
            .filter(|url| !NON_SCREENSHOT_MARKERS.iter().any(|m| url.contains(m)))
            .take(MAX_SCREENSHOTS)
            .collect()
    }
}

impl Default for StatusExtractor {
    fn default() -> Self {
        Self::new()
    }
}

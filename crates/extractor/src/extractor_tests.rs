//! Tests for the page pattern rules and the three-way status decision.
//!
//! Page fixtures are built from fragments matching the real join-page
//! markup layout so every rule is exercised against realistic text.

use betawatch_common::types::{BetaStatus, UNKNOWN_APP};

use crate::{MAX_SCREENSHOTS, StatusExtractor};

// ───────────────────────────── helpers ──────────────────────────────

const CODE: &str = "abcd1234";

fn title_tag(app: &str) -> String {
    format!("<title>Join the {app} beta - TestFlight - Apple</title>")
}

fn icon_style() -> &'static str {
    r"background-image: url(https://is1-ssl.mzstatic.com/image/thumb/Purple126/v4/Icon-Production-83.5x83.5@2x.png/1200x630wa.png)"
}

fn screenshot_style(n: u32) -> String {
    format!(
        "image: url(https://is{n}-ssl.mzstatic.com/image/thumb/PurpleSource126/v4/shot-{n}.png/300x0w.png)"
    )
}

/// A joinable page with title, icon, description, version and one screenshot.
fn available_page(app: &str) -> String {
    format!(
        "<html><head>{}</head><body>\
         <div style=\"{}\"></div>\
         <p class=\"step3\">Get started by <b>installing</b> the app.</p>\
         <span>Version 2.1 (Build 37)</span>\
         <div style=\"{}\"></div>\
         <a>View in TestFlight</a>\
         </body></html>",
        title_tag(app),
        icon_style(),
        screenshot_style(2),
    )
}

// ═══════════════════════════════════════════════════════════════════
//  Status decision
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_full_marker_yields_full() {
    let page = format!("{} This beta is full.", title_tag("Foo"));
    assert_eq!(StatusExtractor::decide_status(&page), BetaStatus::Full);
}

#[test]
fn test_full_marker_wins_over_join_markers() {
    // A page can carry both; capacity takes precedence.
    let page = "View in TestFlight ... This beta is full. ... Step 2";
    assert_eq!(StatusExtractor::decide_status(page), BetaStatus::Full);
}

#[test]
fn test_each_join_marker_yields_available() {
    for marker in [
        "View in TestFlight",
        "To join the",
        "open the link on your iPhone",
        "Step 2",
    ] {
        let page = format!("<html><body>{marker}</body></html>");
        assert_eq!(
            StatusExtractor::decide_status(&page),
            BetaStatus::Available,
            "marker {marker:?} should yield Available"
        );
    }
}

#[test]
fn test_no_marker_yields_unknown() {
    let page = "<html><body>Not Found</body></html>";
    assert_eq!(StatusExtractor::decide_status(page), BetaStatus::Unknown);
}

#[test]
fn test_full_scenario_with_title() {
    let extractor = StatusExtractor::new();
    let page = format!("{} ... This beta is full.", title_tag("Foo"));
    let extracted = extractor.extract(&page, CODE);
    assert_eq!(extracted.status, BetaStatus::Full);
    assert_eq!(extracted.app_name, "Foo");
    assert_eq!(extracted.code, CODE);
}

// ═══════════════════════════════════════════════════════════════════
//  Field extraction
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_available_page_extracts_all_fields() {
    let extractor = StatusExtractor::new();
    let extracted = extractor.extract(&available_page("Foo"), CODE);

    assert_eq!(extracted.status, BetaStatus::Available);
    assert_eq!(extracted.app_name, "Foo");
    assert!(
        extracted
            .icon_url
            .as_deref()
            .is_some_and(|url| url.contains("Icon-Production"))
    );
    assert_eq!(extracted.description, "Get started by installing the app.");

    let version = extracted.version.expect("version should parse");
    assert_eq!(version.version, "2.1");
    assert_eq!(version.build, "37");

    assert_eq!(extracted.screenshots.len(), 1);
    assert!(extracted.screenshots[0].contains("shot-2"));
}

#[test]
fn test_missing_title_uses_sentinel() {
    let extractor = StatusExtractor::new();
    let extracted = extractor.extract("<html><body>Step 2</body></html>", CODE);
    assert_eq!(extracted.app_name, UNKNOWN_APP);
}

#[test]
fn test_extraction_is_idempotent() {
    let extractor = StatusExtractor::new();
    let page = available_page("Foo");
    assert_eq!(extractor.extract(&page, CODE), extractor.extract(&page, CODE));
}

#[test]
fn test_missing_description_is_empty() {
    let extractor = StatusExtractor::new();
    let extracted = extractor.extract("<html><body>Step 2</body></html>", CODE);
    assert!(extracted.description.is_empty());
}

#[test]
fn test_description_strips_markup_and_trims() {
    let extractor = StatusExtractor::new();
    let page = "<p class=\"step3\">  Try the <a href=\"#\">new</a> <b>builds</b> early.\n</p>";
    let extracted = extractor.extract(page, CODE);
    assert_eq!(extracted.description, "Try the new builds early.");
}

#[test]
fn test_long_description_truncated_to_200_plus_ellipsis() {
    let extractor = StatusExtractor::new();
    let long = "x".repeat(450);
    let page = format!("<p class=\"step3\">{long}</p>");
    let extracted = extractor.extract(&page, CODE);
    assert_eq!(extracted.description.len(), 203);
    assert!(extracted.description.ends_with("..."));
    assert_eq!(&extracted.description[..200], &long[..200]);
}

#[test]
fn test_description_at_limit_not_truncated() {
    let extractor = StatusExtractor::new();
    let exact = "y".repeat(200);
    let page = format!("<p class=\"step3\">{exact}</p>");
    let extracted = extractor.extract(&page, CODE);
    assert_eq!(extracted.description, exact);
}

#[test]
fn test_missing_version_is_none() {
    let extractor = StatusExtractor::new();
    let extracted = extractor.extract("<html><body>Step 2</body></html>", CODE);
    assert!(extracted.version.is_none());
}

// ═══════════════════════════════════════════════════════════════════
//  Screenshots
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_screenshots_exclude_icon_assets() {
    let extractor = StatusExtractor::new();
    let page = format!(
        "<div style=\"{}\"></div><div style=\"{}\"></div>\
         image: url(https://is3-ssl.mzstatic.com/image/thumb/Prod-0-0-1x_U007ephone/x.png)",
        icon_style(),
        screenshot_style(1),
    );
    let extracted = extractor.extract(&page, CODE);
    assert_eq!(extracted.screenshots.len(), 1);
    assert!(extracted.screenshots[0].contains("shot-1"));
}

#[test]
fn test_screenshots_capped() {
    let extractor = StatusExtractor::new();
    let page: String = (1..=8).map(|n| screenshot_style(n) + " ").collect();
    let extracted = extractor.extract(&page, CODE);
    assert_eq!(extracted.screenshots.len(), MAX_SCREENSHOTS);
    // Page order preserved
    assert!(extracted.screenshots[0].contains("shot-1"));
    assert!(extracted.screenshots[4].contains("shot-5"));
}

//! Per-field extraction from one review node.
//!
//! Every semantic field runs its own priority-ordered selector chain, scoped
//! to the node, with a field-specific fallback behind it. Field failures are
//! always local: a rating that won't parse never costs us the text, and vice
//! versa. `extract` itself cannot fail.

use chromiumoxide::Element;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::core::types::ReviewRecord;

/// Whole-node fallback text is clipped to this many characters.
const FALLBACK_TEXT_CAP: usize = 500;

/// Author strings at or past this length are assumed to be the wrong element.
const MAX_AUTHOR_CHARS: usize = 100;

const TEXT_SELECTORS: &[&str] = &[
    "span[data-testid='review-text']",
    "div[data-testid='review-text']",
    "p[class*='review']",
    "div[class*='review-text']",
    "span[class*='review']",
];

const RATING_SELECTORS: &[&str] = &[
    "[class*='rating']",
    "[class*='score']",
    "[data-testid*='rating']",
    "[aria-label*='rating']",
];

const AUTHOR_SELECTORS: &[&str] = &[
    "[class*='name']",
    "[class*='author']",
    "[data-testid*='author']",
    "span[class*='reviewer']",
];

const COUNTRY_SELECTORS: &[&str] = &[
    "[class*='country']",
    "[data-testid*='country']",
    "span[title*='country']",
];

const DATE_SELECTORS: &[&str] = &[
    "[class*='date']",
    "[data-testid*='date']",
    "time",
    "span[class*='review-date']",
];

const ROOM_TYPE_SELECTORS: &[&str] = &[
    "[class*='room']",
    "[class*='accommodation']",
    "[data-testid*='room']",
];

const STAY_DURATION_SELECTORS: &[&str] = &[
    "[class*='stay']",
    "[class*='duration']",
    "[class*='nights']",
];

// ── Pure acceptance / normalization rules ────────────────────────────────────

fn rating_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+\.?\d*)").expect("valid rating regex"))
}

/// Parse the first decimal number out of a rating string ("9.0 Excellent").
/// Values on a 5-point scale are rescaled to the site's native 10-point scale.
pub fn normalize_rating(text: &str) -> Option<f64> {
    let captured = rating_regex().captures(text)?.get(1)?.as_str();
    let value: f64 = captured.parse().ok()?;
    Some(if value <= 5.0 { value * 2.0 } else { value })
}

/// An author match is only trusted when it is plausibly a display name.
/// The length gate counts characters, not bytes, so Cyrillic names of an
/// ordinary length aren't thrown away.
pub fn accept_author(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().count() >= MAX_AUTHOR_CHARS {
        return None;
    }
    Some(trimmed.to_string())
}

/// A room-type match must actually talk about a room; `[class*='room']` is
/// loose enough to hit unrelated elements otherwise.
pub fn accept_room_type(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.to_lowercase().contains("room") {
        return None;
    }
    Some(trimmed.to_string())
}

fn accept_non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Whole-node fallback for the review text: trim and clip.
pub fn fallback_text(whole_node_text: &str) -> String {
    whole_node_text.trim().chars().take(FALLBACK_TEXT_CAP).collect()
}

// ── DOM-scoped chain evaluation ──────────────────────────────────────────────

/// Walk `selectors` inside `node`, feeding each non-empty trimmed text match
/// through `accept`. A candidate the rule rejects is treated as a non-match
/// and the chain moves on.
async fn first_accepted<T>(
    node: &Element,
    selectors: &[&str],
    accept: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    for selector in selectors {
        let Ok(el) = node.find_element(*selector).await else {
            continue;
        };
        let Ok(Some(text)) = el.inner_text().await else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        if let Some(value) = accept(&text) {
            return Some(value);
        }
    }
    None
}

async fn extract_text(node: &Element) -> String {
    if let Some(text) = first_accepted(node, TEXT_SELECTORS, accept_non_empty).await {
        return text;
    }
    // Fallback: the node's entire text, clipped.
    match node.inner_text().await {
        Ok(Some(whole)) => fallback_text(&whole),
        _ => String::new(),
    }
}

async fn extract_rating(node: &Element) -> Option<f64> {
    if let Some(rating) = first_accepted(node, RATING_SELECTORS, normalize_rating).await {
        return Some(rating);
    }
    // Fallback: score hidden in the node's own accessibility label.
    match node.attribute("aria-label").await {
        Ok(Some(label)) => normalize_rating(&label),
        _ => None,
    }
}

async fn extract_date(node: &Element) -> String {
    if let Some(date) = first_accepted(node, DATE_SELECTORS, accept_non_empty).await {
        return date;
    }
    // Fallback: machine-readable datetime attribute on a time element.
    if let Ok(time_el) = node.find_element("time").await {
        if let Ok(Some(datetime)) = time_el.attribute("datetime").await {
            return datetime;
        }
    }
    String::new()
}

/// Extract one `ReviewRecord` from a located node. Never fails; every field
/// is guarded independently and defaults to empty/absent on a miss.
pub async fn extract(node: &Element) -> ReviewRecord {
    let text = extract_text(node).await;
    let rating = extract_rating(node).await;
    let author = first_accepted(node, AUTHOR_SELECTORS, accept_author)
        .await
        .unwrap_or_default();
    let country = first_accepted(node, COUNTRY_SELECTORS, accept_non_empty)
        .await
        .unwrap_or_default();
    let date = extract_date(node).await;
    let room_type = first_accepted(node, ROOM_TYPE_SELECTORS, accept_room_type)
        .await
        .unwrap_or_default();
    let stay_duration = first_accepted(node, STAY_DURATION_SELECTORS, accept_non_empty)
        .await
        .unwrap_or_default();

    if text.is_empty() {
        debug!("Review node yielded no text");
    }

    ReviewRecord {
        text,
        rating,
        author,
        country,
        date,
        room_type,
        stay_duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_on_five_point_scale_is_rescaled() {
        assert_eq!(normalize_rating("4.5"), Some(9.0));
        assert_eq!(normalize_rating("Rated 4.5 out of 5"), Some(9.0));
    }

    #[test]
    fn rating_on_ten_point_scale_is_kept() {
        assert_eq!(normalize_rating("8.5"), Some(8.5));
        assert_eq!(normalize_rating("9.0 Excellent"), Some(9.0));
    }

    #[test]
    fn rating_takes_only_the_first_number() {
        // "10" after the slash must not be considered.
        assert_eq!(normalize_rating("4 / 10"), Some(8.0));
    }

    #[test]
    fn rating_without_digits_is_absent() {
        assert_eq!(normalize_rating("Wonderful"), None);
        assert_eq!(normalize_rating(""), None);
    }

    #[test]
    fn author_length_gate() {
        let long = "x".repeat(150);
        assert_eq!(accept_author(&long), None);

        let short = "Maria from accounting, travelling with kids!";
        assert_eq!(accept_author(short), Some(short.to_string()));
    }

    #[test]
    fn author_length_gate_counts_characters_not_bytes() {
        // 59 Cyrillic-heavy characters but well over 100 bytes: a legitimate
        // display name that must not be rejected as "too long".
        let name = "Анна ".repeat(12);
        let name = name.trim();
        assert!(name.len() > MAX_AUTHOR_CHARS);
        assert_eq!(accept_author(name), Some(name.to_string()));

        // 100+ actual characters is still rejected.
        let long = "б".repeat(120);
        assert_eq!(accept_author(&long), None);
    }

    #[test]
    fn room_type_requires_room_substring() {
        assert_eq!(accept_room_type("Deluxe Suite"), None);
        assert_eq!(
            accept_room_type("Superior Room"),
            Some("Superior Room".to_string())
        );
        assert_eq!(
            accept_room_type("  Twin ROOM with view "),
            Some("Twin ROOM with view".to_string())
        );
    }

    #[test]
    fn fallback_text_trims_and_clips() {
        let long = format!("  {}  ", "a".repeat(800));
        let clipped = fallback_text(&long);
        assert_eq!(clipped.len(), 500);

        assert_eq!(fallback_text("  plain review text  "), "plain review text");
    }
}

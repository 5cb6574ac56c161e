//! Page conditioning: get the freshly-loaded hotel page into a state where
//! review nodes can materialize — consent banner gone, reviews section in view.
//!
//! Every step here is best-effort. A selector that matches nothing, a click
//! that bounces off, a fragment jump that 404s — all are logged and swallowed;
//! the pipeline proceeds regardless.

use chromiumoxide::Page;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::config;

/// Consent/cookie-banner dismiss candidates, highest-confidence first.
const OBSTACLE_SELECTORS: &[&str] = &[
    "#onetrust-accept-btn-handler",
    "button[id*='onetrust']",
    "button[class*='cookie']",
    "button[id*='cookie']",
    "button[aria-label*='Accept']",
    "button[aria-label*='Принять']",
];

/// Reviews-tab link/button candidates tried before the free-text scan.
const REVIEWS_LINK_SELECTORS: &[&str] = &[
    "a[href*='#tab-reviews']",
    "button[data-tab='reviews']",
    "a[href*='reviews']",
];

/// Synthetically click the first *visible* element matching `selector`.
/// Runs entirely in page JS so hidden duplicates (mobile/desktop variants of
/// the same banner) are skipped without a round-trip per candidate node.
async fn click_first_visible(page: &Page, selector: &str) -> bool {
    let quoted = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string());
    let script = format!(
        "(() => {{
            const els = document.querySelectorAll({quoted});
            for (const el of els) {{
                if (el.offsetParent !== null) {{ el.click(); return true; }}
            }}
            return false;
        }})()"
    );
    match page.evaluate(script).await {
        Ok(v) => v
            .into_value::<serde_json::Value>()
            .ok()
            .and_then(|j| j.as_bool())
            .unwrap_or(false),
        Err(e) => {
            debug!("Click candidate '{}' failed: {}", selector, e);
            false
        }
    }
}

/// Dismiss interstitial obstacles (consent banners). Never fails the pipeline.
pub async fn dismiss_obstacles(page: &Page) {
    for selector in OBSTACLE_SELECTORS {
        if click_first_visible(page, selector).await {
            info!("Cookie banner closed via '{}'", selector);
            tokio::time::sleep(Duration::from_millis(config::settle_click_ms())).await;
            return;
        }
    }
    debug!("No cookie banner found");
}

/// Best-effort navigation to the reviews section. Two independent attempts:
/// (a) reload with the reviews-tab fragment, (b) find and click a link that
/// looks like "Reviews" across language variants. Either, both, or neither
/// may succeed.
pub async fn reach_reviews_section(page: &Page, base_url: &str) {
    // (a) fragment rewrite + reload
    match Url::parse(base_url) {
        Ok(mut u) => {
            u.set_fragment(Some("tab-reviews"));
            match page.goto(u.as_str()).await {
                Ok(_) => {
                    info!("Navigated to reviews tab fragment");
                    tokio::time::sleep(Duration::from_millis(config::settle_section_ms())).await;
                }
                Err(e) => warn!("Could not navigate to reviews tab directly: {}", e),
            }
        }
        Err(e) => warn!("Could not rewrite URL for reviews tab: {}", e),
    }

    // (b) click a reviews link/button if one is present
    for selector in REVIEWS_LINK_SELECTORS {
        if click_first_visible(page, selector).await {
            info!("Clicked reviews link via '{}'", selector);
            tokio::time::sleep(Duration::from_millis(config::settle_section_ms())).await;
            return;
        }
    }

    // Free-text scan: anchors/buttons labelled "Reviews" in known languages.
    let script = r#"(() => {
        const re = /\b(reviews|отзывы)\b/i;
        for (const el of document.querySelectorAll('a, button')) {
            const label = (el.innerText || '').trim();
            if (label && label.length < 40 && re.test(label) && el.offsetParent !== null) {
                el.scrollIntoView(true);
                el.click();
                return true;
            }
        }
        return false;
    })()"#;
    let clicked = match page.evaluate(script).await {
        Ok(v) => v
            .into_value::<serde_json::Value>()
            .ok()
            .and_then(|j| j.as_bool())
            .unwrap_or(false),
        Err(e) => {
            debug!("Reviews link text scan failed: {}", e);
            false
        }
    };
    if clicked {
        info!("Clicked reviews link via text scan");
        tokio::time::sleep(Duration::from_millis(config::settle_section_ms())).await;
    } else {
        debug!("No reviews link found to click");
    }
}

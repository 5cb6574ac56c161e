//! Lazy-load expansion: keep nudging the viewport until enough review nodes
//! have materialized or the iteration budget runs out. Never fails — a page
//! that refuses to grow simply exhausts the budget.

use chromiumoxide::Page;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config;
use crate::scraping::locator;

/// Upper bound on scroll passes per request.
const MAX_SCROLL_PASSES: usize = 8;

/// Reviews-container landmarks to scroll into view between passes, first
/// match wins. Coaxes intersection-observer loaders that ignore plain
/// bottom-of-document scrolling.
const LANDMARK_SELECTORS: &[&str] = &[
    "[data-testid='reviews']",
    "#review_list_page",
    ".review_list",
    "[id*='review']",
    "[class*='review-list']",
];

async fn scroll_to_bottom(page: &Page) {
    if let Err(e) = page
        .evaluate("window.scrollTo(0, document.body.scrollHeight);")
        .await
    {
        debug!("Scroll-to-bottom error: {}", e);
    }
}

/// Scroll the first present landmark into view. Best-effort.
async fn scroll_to_landmark(page: &Page) {
    for selector in LANDMARK_SELECTORS {
        let quoted = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string());
        let script = format!(
            "(() => {{
                const el = document.querySelector({quoted});
                if (!el) return false;
                el.scrollIntoView(true);
                return true;
            }})()"
        );
        let hit = page
            .evaluate(script)
            .await
            .ok()
            .and_then(|v| v.into_value::<serde_json::Value>().ok())
            .and_then(|j| j.as_bool())
            .unwrap_or(false);
        if hit {
            tokio::time::sleep(Duration::from_millis(config::settle_scroll_ms())).await;
            return;
        }
    }
}

/// Repeatedly scroll the document to trigger lazy loading, stopping early once
/// the locator counts at least `target_count` review nodes.
pub async fn expand(page: &Page, target_count: usize) {
    for pass in 0..MAX_SCROLL_PASSES {
        scroll_to_bottom(page).await;
        tokio::time::sleep(Duration::from_millis(config::settle_scroll_ms())).await;

        let loaded = locator::count_located(page).await;
        if loaded >= target_count {
            info!("Loaded {} reviews after {} scroll passes", loaded, pass + 1);
            return;
        }
        debug!("Scroll pass {}: {} reviews loaded", pass + 1, loaded);

        scroll_to_landmark(page).await;
    }
    info!("Scroll budget exhausted after {} passes", MAX_SCROLL_PASSES);
}

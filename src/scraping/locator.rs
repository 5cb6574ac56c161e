//! Review node location.
//!
//! A fixed, priority-ordered list of structural strategies is probed in order;
//! the first strategy yielding any node wins and everything below it is never
//! consulted. When the whole chain comes up empty, a broad class-substring
//! query is used as a last resort, capped at `max_results * 3` right here so
//! a pathological page can't hand the extractor an unbounded node walk.

use chromiumoxide::Element;
use chromiumoxide::Page;
use std::future::Future;
use tracing::{info, warn};

/// Structural strategies, highest-confidence first: test hooks, semantic
/// class names, microdata, then increasingly loose class-substring guesses.
pub const REVIEW_SELECTORS: &[&str] = &[
    "div[data-testid='review']",
    "div[data-testid='review-item']",
    "article[data-testid='review']",
    "li[data-testid='review']",
    "div.review-item",
    "div.c-review",
    "div.review_list_item",
    "div.review_item",
    "div.review-block",
    "div.review-item-block",
    "div[itemprop='review']",
    "div.review_body",
    "div[class*='review']",
    "div[class*='Review']",
];

/// Case-insensitive class-substring query for the last-resort sweep.
const BROAD_FALLBACK_SELECTOR: &str = "div[class*='review' i]";

/// Probe `selectors` in order, returning the first strategy that yields at
/// least one item together with its selector. Lower-priority strategies are
/// not attempted once any strategy succeeds.
async fn first_yielding<T, F, Fut>(
    selectors: &'static [&'static str],
    mut probe: F,
) -> Option<(&'static str, Vec<T>)>
where
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = Vec<T>>,
{
    for &selector in selectors {
        let found = probe(selector).await;
        if !found.is_empty() {
            return Some((selector, found));
        }
    }
    None
}

async fn probe_page(page: &Page, selector: &str) -> Vec<Element> {
    // A selector the engine rejects is treated the same as a clean miss.
    page.find_elements(selector).await.unwrap_or_default()
}

/// Locate the candidate review nodes on the live page.
pub async fn locate(page: &Page, max_results: usize) -> Vec<Element> {
    if let Some((selector, found)) =
        first_yielding(REVIEW_SELECTORS, |sel| probe_page(page, sel)).await
    {
        info!("Found {} reviews using selector: {}", found.len(), selector);
        return found;
    }

    warn!("No reviews found with standard selectors, trying broad class scan");
    let cap = max_results.saturating_mul(3);
    match page.find_elements(BROAD_FALLBACK_SELECTOR).await {
        Ok(mut candidates) => {
            info!(
                "Broad scan found {} candidate elements (cap {})",
                candidates.len(),
                cap
            );
            candidates.truncate(cap);
            candidates
        }
        Err(e) => {
            warn!("Broad review scan failed: {}", e);
            Vec::new()
        }
    }
}

/// Counting mode for the lazy-load driver: how many nodes the strategy chain
/// currently yields. The broad fallback is deliberately excluded — progress
/// is only measured against selectors we'd actually trust.
pub async fn count_located(page: &Page) -> usize {
    first_yielding(REVIEW_SELECTORS, |sel| probe_page(page, sel))
        .await
        .map(|(_, found)| found.len())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const STRATEGIES: &[&str] = &["one", "two", "three", "four"];

    async fn run(yields: HashMap<&'static str, Vec<u32>>) -> Option<(&'static str, Vec<u32>)> {
        let probed = std::cell::RefCell::new(Vec::new());
        let result = first_yielding(STRATEGIES, |sel| {
            probed.borrow_mut().push(sel);
            let found = yields.get(sel).cloned().unwrap_or_default();
            async move { found }
        })
        .await;
        // Short-circuit: nothing after the winning strategy may be probed.
        if let Some((winner, _)) = &result {
            assert_eq!(probed.borrow().last(), Some(winner));
        }
        result
    }

    #[tokio::test]
    async fn third_strategy_wins_when_first_two_miss() {
        let mut yields = HashMap::new();
        yields.insert("three", vec![1, 2, 3, 4, 5]);
        yields.insert("four", vec![9]);
        let (winner, found) = run(yields).await.unwrap();
        assert_eq!(winner, "three");
        assert_eq!(found.len(), 5);
    }

    #[tokio::test]
    async fn single_hit_on_first_strategy_short_circuits() {
        let mut yields = HashMap::new();
        yields.insert("one", vec![42]);
        yields.insert("three", vec![1, 2, 3, 4, 5]);
        let (winner, found) = run(yields).await.unwrap();
        assert_eq!(winner, "one");
        assert_eq!(found, vec![42]);
    }

    #[tokio::test]
    async fn empty_chain_yields_none() {
        assert!(run(HashMap::new()).await.is_none());
    }
}

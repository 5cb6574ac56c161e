//! Top-level scrape pipeline: one session, strictly sequential stages,
//! teardown on every exit path.
//!
//! navigate → condition → expand → locate → extract → assemble
//!
//! Internal failures never escape to the caller as errors: launch or
//! navigation trouble is logged and surfaced as an empty record sequence.
//! Transport-level reporting is the HTTP shim's job.

use futures::future::BoxFuture;
use std::time::Duration;
use tracing::{error, info};

use crate::core::config;
use crate::core::types::ReviewRecord;
use crate::scraping::error::ScrapeError;
use crate::scraping::session::BrowserSession;
use crate::scraping::{assembler, conditioner, extractor, lazy_load, locator};

/// A browser handle the frame can release. Release must be idempotent and
/// must never raise; the frame invokes it exactly once per acquired session.
pub(crate) trait SessionHandle {
    async fn close(&mut self);
}

impl SessionHandle for BrowserSession {
    async fn close(&mut self) {
        BrowserSession::close(self).await;
    }
}

/// Scrape up to `max_results` reviews from the hotel page at `url`.
///
/// Always returns an ordered sequence, possibly empty; the browser session is
/// released exactly once whether the run succeeds or dies mid-stage.
pub async fn scrape_reviews(url: &str, max_results: usize) -> Vec<ReviewRecord> {
    info!("Starting to parse reviews from: {}", url);

    let target = url.to_string();
    scrape_frame(BrowserSession::acquire().await, move |session: &BrowserSession| {
        Box::pin(run(session, target, max_results))
    })
    .await
}

/// The acquire/close frame around the pipeline body.
///
/// A failed acquire launches nothing and therefore releases nothing. Once a
/// session exists, `close` runs before the body's result is even inspected —
/// success, stage failure, either way, exactly once.
async fn scrape_frame<S, F>(acquired: Result<S, ScrapeError>, body: F) -> Vec<ReviewRecord>
where
    S: SessionHandle,
    F: for<'a> FnOnce(&'a S) -> BoxFuture<'a, Result<Vec<ReviewRecord>, ScrapeError>>,
{
    let mut session = match acquired {
        Ok(s) => s,
        Err(e) => {
            // Nothing was launched; nothing to release.
            error!("Could not start scrape: {}", e);
            return Vec::new();
        }
    };

    let result = body(&session).await;

    session.close().await;

    match result {
        Ok(reviews) => {
            info!("✅ Successfully parsed {} reviews", reviews.len());
            reviews
        }
        Err(e) => {
            error!("Scrape pipeline failed: {}", e);
            Vec::new()
        }
    }
}

async fn run(
    session: &BrowserSession,
    url: String,
    max_results: usize,
) -> Result<Vec<ReviewRecord>, ScrapeError> {
    let page = session.open(&url).await.map_err(ScrapeError::Navigation)?;

    // Settle for client-side rendering before touching the DOM.
    tokio::time::sleep(Duration::from_millis(config::settle_nav_ms())).await;

    conditioner::dismiss_obstacles(&page).await;
    conditioner::reach_reviews_section(&page, &url).await;

    lazy_load::expand(&page, max_results).await;

    let nodes = locator::locate(&page, max_results).await;
    info!("Found {} review elements", nodes.len());

    let reviews = assembler::assemble(
        nodes,
        |node| async move { extractor::extract(&node).await },
        max_results,
    )
    .await;

    Ok(reviews)
}

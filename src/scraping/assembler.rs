//! Result assembly: walk the located candidates in locator order, extract
//! each, keep only records with valid text, and stop at `max_results`.

use std::future::Future;
use tracing::debug;

use crate::core::types::ReviewRecord;

/// Assemble the final ordered record sequence.
///
/// At most `max_results * 2` candidates are examined — enough headroom to
/// survive empty/duplicate nodes without walking a whole pathological page.
/// Returns an empty vec (never an error) when nothing qualifies.
pub async fn assemble<N, F, Fut>(
    nodes: Vec<N>,
    mut extract: F,
    max_results: usize,
) -> Vec<ReviewRecord>
where
    F: FnMut(N) -> Fut,
    Fut: Future<Output = ReviewRecord>,
{
    let budget = nodes.len().min(max_results.saturating_mul(2));
    let mut records = Vec::with_capacity(max_results.min(budget));

    for (idx, node) in nodes.into_iter().take(budget).enumerate() {
        let record = extract(node).await;
        if record.has_valid_text() {
            records.push(record);
            if records.len() >= max_results {
                break;
            }
        } else {
            debug!("Candidate {} dropped: no usable text", idx);
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str) -> ReviewRecord {
        ReviewRecord {
            text: text.to_string(),
            ..Default::default()
        }
    }

    async fn fake_extract(text: String) -> ReviewRecord {
        record(&text)
    }

    #[tokio::test]
    async fn caps_at_max_results_in_locator_order() {
        let nodes: Vec<String> = (0..12).map(|i| format!("a well-formed review #{i}")).collect();
        let result = assemble(nodes, fake_extract, 10).await;
        assert_eq!(result.len(), 10);
        assert!(result[0].text.ends_with("#0"));
        assert!(result[9].text.ends_with("#9"));
        assert!(result.iter().all(|r| r.has_valid_text()));
    }

    #[tokio::test]
    async fn invalid_text_records_are_dropped_entirely() {
        let nodes = vec![
            "short".to_string(),
            "a review long enough to keep".to_string(),
            "   ".to_string(),
            "another review long enough to keep".to_string(),
        ];
        let result = assemble(nodes, fake_extract, 10).await;
        assert_eq!(result.len(), 2);
        assert!(result[0].text.starts_with("a review"));
    }

    #[tokio::test]
    async fn examines_at_most_twice_max_results() {
        // Only the first 4 candidates (2 * max_results) may be touched; the
        // valid ones hiding behind them must never be reached.
        let mut nodes = vec!["x".to_string(); 4];
        nodes.extend((0..5).map(|i| format!("buried valid review #{i}")));
        let result = assemble(nodes, fake_extract, 2).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn empty_candidates_yield_empty_result() {
        let result = assemble(Vec::<String>::new(), fake_extract, 10).await;
        assert!(result.is_empty());
    }
}

//! Cross-module properties of the extraction pipeline that don't need a live
//! browser: field acceptance rules, assembly ordering/capping, and the JSON
//! shape the shim returns.

use reviewcrawl::scraping::assembler::assemble;
use reviewcrawl::scraping::extractor::{
    accept_author, accept_room_type, fallback_text, normalize_rating,
};
use reviewcrawl::types::ReviewRecord;

fn well_formed(i: usize) -> ReviewRecord {
    ReviewRecord {
        text: format!("Great location and friendly staff, visit #{i}"),
        rating: Some(8.5),
        author: format!("Guest {i}"),
        country: "Netherlands".to_string(),
        date: "2026-07-12".to_string(),
        room_type: "Standard Double Room".to_string(),
        stay_duration: "2 nights".to_string(),
    }
}

#[tokio::test]
async fn twelve_well_formed_nodes_assemble_to_exactly_ten() {
    let nodes: Vec<usize> = (0..12).collect();
    let result = assemble(nodes, |i| async move { well_formed(i) }, 10).await;

    assert_eq!(result.len(), 10);
    // Examined in locator order.
    for (i, record) in result.iter().enumerate() {
        assert!(record.text.ends_with(&format!("#{i}")));
        assert!(record.text.trim().len() > 10);
    }
}

#[tokio::test]
async fn result_never_exceeds_max_results() {
    for max in [1usize, 3, 10, 25] {
        let nodes: Vec<usize> = (0..40).collect();
        let result = assemble(nodes, |i| async move { well_formed(i) }, max).await;
        assert!(result.len() <= max);
    }
}

#[tokio::test]
async fn caller_never_observes_a_partial_record() {
    // Nodes whose extraction yields junk text must vanish entirely, not show
    // up half-filled.
    let nodes: Vec<usize> = (0..6).collect();
    let result = assemble(
        nodes,
        |i| async move {
            if i % 2 == 0 {
                ReviewRecord {
                    text: "ok".to_string(), // below the validity threshold
                    rating: Some(9.0),
                    ..Default::default()
                }
            } else {
                well_formed(i)
            }
        },
        10,
    )
    .await;

    assert_eq!(result.len(), 3);
    assert!(result.iter().all(|r| r.text.trim().len() > 10));
}

#[test]
fn rating_normalization_boundary_cases() {
    assert_eq!(normalize_rating("4.5"), Some(9.0));
    assert_eq!(normalize_rating("8.5"), Some(8.5));
    // 5.0 is still treated as a 5-point scale value.
    assert_eq!(normalize_rating("5"), Some(10.0));
    assert_eq!(normalize_rating("10"), Some(10.0));
}

#[test]
fn field_acceptance_rules() {
    assert_eq!(accept_room_type("Deluxe Suite"), None);
    assert_eq!(
        accept_room_type("Superior Room"),
        Some("Superior Room".to_string())
    );

    assert!(accept_author(&"y".repeat(150)).is_none());
    assert!(accept_author(&"y".repeat(40)).is_some());

    assert_eq!(fallback_text(&"z".repeat(2000)).len(), 500);
}

#[tokio::test]
async fn length_gates_count_characters_not_bytes() {
    // Cyrillic input stresses every length rule: an eight-character review
    // ("Отлично!") is fifteen bytes and must still fail the >10 gate, so it
    // can never enter an assembled result.
    let nodes = vec!["Отлично!".to_string(), "Чудесный отдых на море".to_string()];
    let result = assemble(
        nodes,
        |text| async move {
            ReviewRecord {
                text,
                ..Default::default()
            }
        },
        10,
    )
    .await;
    assert_eq!(result.len(), 1);
    assert!(result[0].text.starts_with("Чудесный"));

    // A 59-character Cyrillic author is over 100 bytes yet a perfectly
    // ordinary display name.
    let name = "Анна ".repeat(12);
    assert!(accept_author(name.trim()).is_some());
}

#[test]
fn response_json_keys_are_stable() {
    let record = well_formed(0);
    let json = serde_json::to_value(&record).unwrap();
    for key in ["text", "rating", "author", "country", "date", "room_type", "stay_duration"] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }

    // Absent rating disappears; string fields stay as empty strings.
    let sparse = ReviewRecord {
        text: "long enough to pass the gate".to_string(),
        ..Default::default()
    };
    let json = serde_json::to_value(&sparse).unwrap();
    assert!(json.get("rating").is_none());
    assert_eq!(json.get("room_type").unwrap(), "");
}

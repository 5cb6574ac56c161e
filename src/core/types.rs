use serde::{Deserialize, Serialize};

fn default_max_reviews() -> usize {
    10
}

/// Body of `POST /api/parse-reviews`. Immutable once accepted.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub booking_url: String,
    #[serde(default)]
    pub hotel_id: Option<String>,
    #[serde(default = "default_max_reviews")]
    pub max_reviews: usize,
}

/// One extracted guest review.
///
/// `text` is the only required field; everything else is best-effort and
/// defaults to an empty string so the response schema stays stable even when
/// individual selectors come up empty. `rating` is omitted entirely when no
/// parseable score was found.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub stay_duration: String,
}

impl ReviewRecord {
    /// A record only enters the final result when its text survives trimming
    /// with more than 10 characters. Anything shorter is selector debris.
    /// Counted in characters, not bytes — reviews are routinely Cyrillic.
    pub fn has_valid_text(&self) -> bool {
        self.text.trim().chars().count() > 10
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewsResponse {
    pub status: String,
    pub reviews_found: usize,
    pub reviews: Vec<ReviewRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_validity_requires_more_than_ten_chars() {
        let mut r = ReviewRecord {
            text: "   short   ".to_string(),
            ..Default::default()
        };
        assert!(!r.has_valid_text());

        r.text = "exactly10!".to_string(); // 10 chars — still too short
        assert!(!r.has_valid_text());

        r.text = "  a perfectly fine review  ".to_string();
        assert!(r.has_valid_text());
    }

    #[test]
    fn text_validity_counts_characters_not_bytes() {
        // Eight Cyrillic characters span fifteen bytes; the gate must still
        // treat this as an eight-character string and reject it.
        let mut r = ReviewRecord {
            text: "Отлично!".to_string(),
            ..Default::default()
        };
        assert!(!r.has_valid_text());

        r.text = "Чудесный отдых на море".to_string();
        assert!(r.has_valid_text());
    }

    #[test]
    fn rating_is_omitted_from_json_when_absent() {
        let r = ReviewRecord {
            text: "lovely stay, would come back".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("rating").is_none());
        assert_eq!(json.get("author").unwrap(), "");
    }

    #[test]
    fn max_reviews_defaults_to_ten() {
        let req: ScrapeRequest =
            serde_json::from_str(r#"{"booking_url":"https://www.booking.com/hotel/x.html"}"#)
                .unwrap();
        assert_eq!(req.max_reviews, 10);
        assert!(req.hotel_id.is_none());
    }
}

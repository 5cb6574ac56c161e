pub mod core;
pub mod scraping;

// --- Primary core exports ---
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::AppState;

pub use crate::scraping::pipeline::scrape_reviews;

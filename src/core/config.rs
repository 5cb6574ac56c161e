use std::path::Path;

// ---------------------------------------------------------------------------
// Env-var configuration accessors. Every knob resolves env → default so the
// fixed waits and binary locations stay tunable without a rebuild.
// ---------------------------------------------------------------------------

/// Explicit browser binary override: `CHROME_BINARY` → `CHROME_EXECUTABLE`.
/// Only honoured when the path actually exists on disk.
pub fn chrome_binary_override() -> Option<String> {
    for key in ["CHROME_BINARY", "CHROME_EXECUTABLE"] {
        if let Ok(p) = std::env::var(key) {
            if !p.trim().is_empty() && Path::new(&p).exists() {
                return Some(p);
            }
        }
    }
    None
}

/// Explicit driver binary path (`CHROMEDRIVER_PATH`). The CDP launch path
/// talks to the browser directly and needs no separate driver process; the
/// value is accepted for deployment compatibility and surfaced in logs only.
pub fn chromedriver_path() -> Option<String> {
    std::env::var("CHROMEDRIVER_PATH")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

/// Settle interval after a navigation, in ms. Client-side rendering on the
/// booking page routinely needs several seconds before the DOM is usable.
pub fn settle_nav_ms() -> u64 {
    env_u64("SETTLE_NAV_MS", 5000)
}

/// Settle interval after a scroll step, in ms.
pub fn settle_scroll_ms() -> u64 {
    env_u64("SETTLE_SCROLL_MS", 2000)
}

/// Settle interval after a synthetic click (banner dismissal, tab link), in ms.
pub fn settle_click_ms() -> u64 {
    env_u64("SETTLE_CLICK_MS", 1000)
}

/// Settle interval after jumping to the reviews tab fragment, in ms.
pub fn settle_section_ms() -> u64 {
    env_u64("SETTLE_SECTION_MS", 3000)
}

/// Upper bound on concurrently live browser sessions (`MAX_BROWSER_SESSIONS`).
/// One headless Chromium per request is expensive; hosts rarely sustain many.
pub fn max_browser_sessions() -> usize {
    std::env::var("MAX_BROWSER_SESSIONS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_defaults_are_sane() {
        // Without env overrides the fixed waits fall back to known values.
        assert!(settle_nav_ms() >= 1000);
        assert!(settle_scroll_ms() >= 500);
        assert!(max_browser_sessions() >= 1);
    }
}

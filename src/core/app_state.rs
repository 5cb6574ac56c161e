use std::sync::Arc;

/// Shared state for the HTTP shim.
///
/// Each request drives exactly one browser session; the semaphore bounds how
/// many Chromium processes are alive at once (see `MAX_BROWSER_SESSIONS`).
/// No session, page handle, or scrape result is ever shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub session_limit: Arc<tokio::sync::Semaphore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session_permits", &self.session_limit.available_permits())
            .finish()
    }
}

impl AppState {
    pub fn new() -> Self {
        let limit = crate::core::config::max_browser_sessions();
        Self {
            session_limit: Arc::new(tokio::sync::Semaphore::new(limit)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

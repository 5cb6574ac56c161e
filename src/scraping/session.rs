//! Browser session lifecycle using `chromiumoxide`.
//!
//! This module is the single source of truth for:
//! * Finding a usable browser executable (env override → PATH → well-known paths).
//! * Building the headless launch config with anti-detection flags.
//! * `BrowserSession` — exactly one live Chromium per scrape request, with a
//!   teardown that is idempotent and never raises past the call.
//!
//! No WebDriver sidecar is involved: chromiumoxide speaks CDP to the browser
//! process directly, so `CHROMEDRIVER_PATH` is accepted but only logged.

use anyhow::{anyhow, Result};
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use rand::seq::IndexedRandom;
use std::path::Path;
use tracing::{info, warn};

use crate::core::config;
use crate::scraping::error::ScrapeError;

const DESKTOP_USER_AGENTS: &[&str] = &[
    // Chrome 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 132 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 131 – Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Edge 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 Edg/132.0.0.0",
];

/// Returns a randomly-chosen realistic desktop User-Agent string.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    DESKTOP_USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(DESKTOP_USER_AGENTS[0])
}

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_BINARY` / `CHROME_EXECUTABLE` env vars (explicit override)
/// 2. PATH scan — finds package-manager installs on all platforms.
/// 3. OS-specific well-known install paths.
pub fn find_browser_executable() -> Option<String> {
    if let Some(p) = config::chrome_binary_override() {
        info!("Using browser binary from env: {}", p);
        return Some(p);
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "chromium",
            "chromium-browser",
            "google-chrome",
            "chrome",
            "brave-browser",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/bin/brave-browser",
            "/usr/local/bin/chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

/// Build a `BrowserConfig` for headless operation with stealth defaults.
///
/// Flags chosen for:
/// * Compatibility with CI / containerized environments (`--no-sandbox`,
///   `--disable-dev-shm-usage`).
/// * Stealth — `--disable-blink-features=AutomationControlled` hides the
///   `navigator.webdriver` flag; UA is drawn from `DESKTOP_USER_AGENTS`.
fn build_headless_config(exe: &str, width: u32, height: u32) -> Result<BrowserConfig> {
    let ua = random_user_agent();

    BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        // Stealth: suppress CDP automation fingerprint
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--user-agent={}", ua))
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {}", e))
}

/// One live headless browser, exclusively owned by a single pipeline run.
///
/// States: launched (`browser` is `Some`) → closed (`browser` is `None`).
/// `close()` is idempotent and logs instead of raising; `Drop` is a safety
/// net against zombie Chromium processes on panic paths.
pub struct BrowserSession {
    browser: Option<Browser>,
    handler: Option<tokio::task::JoinHandle<()>>,
}

impl BrowserSession {
    /// Launch a fresh headless browser. Fatal to the request on failure.
    pub async fn acquire() -> Result<Self, ScrapeError> {
        let exe = find_browser_executable().ok_or_else(|| {
            ScrapeError::Launch(anyhow!(
                "No browser found. Install Chromium or Chrome, or set CHROME_BINARY to its location."
            ))
        })?;

        if let Some(driver) = config::chromedriver_path() {
            // Informational only: CDP needs no driver process.
            info!("CHROMEDRIVER_PATH is set ({}) but unused by CDP launch", driver);
        }

        let browser_config = build_headless_config(&exe, 1920, 1080)
            .map_err(ScrapeError::Launch)?;

        info!("🚀 Launching headless browser: {}", exe);
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScrapeError::Launch(anyhow!("Failed to launch browser ({}): {}", exe, e)))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
        });

        Ok(Self {
            browser: Some(browser),
            handler: Some(handle),
        })
    }

    /// Open a new tab on the session's browser.
    pub async fn open(&self, url: &str) -> Result<Page> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| anyhow!("session already closed"))?;
        browser
            .new_page(url)
            .await
            .map_err(|e| anyhow!("Failed to open page {}: {}", url, e))
    }

    /// Tear the browser down. Safe to call twice; never raises.
    pub async fn close(&mut self) {
        if let Some(browser) = self.browser.take() {
            shutdown(browser, self.handler.take()).await;
            info!("🛑 Browser session closed");
        }
    }
}

/// Close the browser, then stop its event handler. The handler must outlive
/// the close call — it carries the CDP responses `Browser::close` waits on.
async fn shutdown(mut browser: Browser, handler: Option<tokio::task::JoinHandle<()>>) {
    if let Err(e) = browser.close().await {
        warn!("Browser close error (non-fatal): {}", e);
    }
    if let Some(handle) = handler {
        handle.abort();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Drop cannot await; if we're inside a tokio runtime, spawn the same
        // shutdown used by `close()` so a panic path doesn't leak a Chromium
        // process or abort the handler before the close command is delivered.
        if let Some(browser) = self.browser.take() {
            let handler = self.handler.take();
            if let Ok(rt) = tokio::runtime::Handle::try_current() {
                rt.spawn(shutdown(browser, handler));
            } else if let Some(handle) = handler {
                handle.abort();
            }
        }
    }
}

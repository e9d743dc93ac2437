//! Rendered fetch strategy — headless Chromium via chromiumoxide.
//!
//! Launches one isolated browser session per request and tears it down on
//! every exit path, success and failure alike. Sessions are never pooled or
//! reused: leaking a Chromium process is worse than paying the launch cost,
//! and expected traffic is low-cardinality and cache-absorbed.

use super::{profile_url, FetchStrategy, FetchedDocument, USER_AGENT};
use crate::error::FetchError;
use crate::phone::PhoneNumber;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. ZALO_PROXY_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("ZALO_PROXY_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.zalo-proxy/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".zalo-proxy/chromium/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".zalo-proxy/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".zalo-proxy/chromium/chrome-linux64/chrome"),
                home.join(".zalo-proxy/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

pub struct RenderedFetcher {
    base_url: String,
    nav_timeout: Duration,
    settle: Duration,
}

impl RenderedFetcher {
    /// `nav_timeout_ms` bounds navigation until network activity settles;
    /// `settle_ms` is the additional fixed delay for client-side rendering.
    pub fn new(base_url: &str, nav_timeout_ms: u64, settle_ms: u64) -> Self {
        Self {
            base_url: base_url.to_string(),
            nav_timeout: Duration::from_millis(nav_timeout_ms),
            settle: Duration::from_millis(settle_ms),
        }
    }

    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let chrome_path = find_chromium().ok_or_else(|| {
            FetchError::Browser(
                "Chromium not found; install it or set ZALO_PROXY_CHROMIUM_PATH".to_string(),
            )
        })?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| FetchError::Browser(format!("failed to build browser config: {e}")))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Browser(format!("failed to launch Chromium: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let result = self.read_page(&browser, url).await;

        // Teardown runs before the result is surfaced so the OS process is
        // released on the error paths too.
        let _ = browser.close().await;
        let _ = browser.wait().await;
        handler_task.abort();

        result
    }

    async fn read_page(&self, browser: &Browser, url: &str) -> Result<String, FetchError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(format!("failed to create page: {e}")))?;

        let _ = page.set_user_agent(USER_AGENT).await;

        // One timeout window bounds the whole navigation, including the
        // wait for the final navigation event — a stalled page must not
        // hold the browser process past the configured limit.
        let nav = tokio::time::timeout(self.nav_timeout, async {
            page.goto(url).await?;
            let _ = page.wait_for_navigation().await;
            Ok::<(), chromiumoxide::error::CdpError>(())
        })
        .await;
        match nav {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(FetchError::Transport(format!("navigation failed: {e}"))),
            Err(_) => return Err(FetchError::Timeout),
        }

        // The profile body is client-rendered; give the scripts a fixed
        // window to populate the DOM.
        tokio::time::sleep(self.settle).await;

        let value = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| FetchError::Browser(format!("failed to read DOM: {e}")))?;

        let html: String = value
            .into_value()
            .map_err(|e| FetchError::Browser(format!("failed to convert DOM result: {e:?}")))?;

        let _ = page.close().await;
        Ok(html)
    }
}

#[async_trait]
impl FetchStrategy for RenderedFetcher {
    async fn fetch(&self, phone: &PhoneNumber) -> Result<FetchedDocument, FetchError> {
        let url = profile_url(&self.base_url, phone);
        tracing::debug!("rendered fetch: {url}");

        let html = self.render(&url).await?;

        Ok(FetchedDocument {
            url,
            html,
            rendered: true,
        })
    }

    fn name(&self) -> &'static str {
        "rendered"
    }
}

//! Static fetch strategy — a plain HTTP GET wrapping reqwest.
//!
//! Not a browser: no script execution. Good enough whenever the profile
//! title is populated server-side, which is the common case.

use super::{profile_url, FetchStrategy, FetchedDocument, USER_AGENT};
use crate::error::FetchError;
use crate::phone::PhoneNumber;
use async_trait::async_trait;
use std::time::Duration;

pub struct StaticFetcher {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl StaticFetcher {
    pub fn new(base_url: &str, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.to_string(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl FetchStrategy for StaticFetcher {
    async fn fetch(&self, phone: &PhoneNumber) -> Result<FetchedDocument, FetchError> {
        let url = profile_url(&self.base_url, phone);
        tracing::debug!("static fetch: {url}");

        let resp = self
            .client
            .get(&url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "vi-VN,vi;q=0.9,en;q=0.8")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let html = resp.text().await.map_err(classify)?;

        Ok(FetchedDocument {
            url,
            html,
            rendered: false,
        })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        let fetcher = StaticFetcher::new("https://zalo.me", 10_000);
        assert_eq!(fetcher.name(), "static");
        assert_eq!(fetcher.timeout, Duration::from_millis(10_000));
    }

    #[tokio::test]
    async fn test_transport_error_on_unreachable_host() {
        // Bind a listener to reserve a port, then drop it so connects fail.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = StaticFetcher::new(&format!("http://{addr}"), 2_000);
        let phone = PhoneNumber::normalize("0398981698", "+84", "0");
        match fetcher.fetch(&phone).await {
            Err(FetchError::Transport(_)) | Err(FetchError::Timeout) => {}
            other => panic!("expected transport failure, got {other:?}"),
        }
    }
}

//! Fetch strategies for retrieving a profile document.
//!
//! Two interchangeable strategies exist: a plain HTTP GET
//! ([`static_http::StaticFetcher`]) and a headless-browser render
//! ([`rendered::RenderedFetcher`]). Neither retries internally — a failed
//! fetch is reported once, and the caller may retry the whole lookup.

pub mod rendered;
pub mod static_http;

use crate::error::FetchError;
use crate::phone::PhoneNumber;
use async_trait::async_trait;

/// Browser-like user agent; the profile site serves different markup to
/// obvious bots.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A profile document retrieved for one lookup.
///
/// Transient — lives only for the duration of the request, then is dropped.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// URL the document was fetched from.
    pub url: String,
    /// Raw response body, decompressed if transport-compressed.
    pub html: String,
    /// Whether client-side scripts ran before the snapshot. Extraction rules
    /// that rely on the rendered DOM check this flag.
    pub rendered: bool,
}

/// An interchangeable method for obtaining the remote profile document,
/// selected at configuration time.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    async fn fetch(&self, phone: &PhoneNumber) -> Result<FetchedDocument, FetchError>;

    /// Strategy name for logs and diagnostics.
    fn name(&self) -> &'static str;
}

/// Build the profile URL for a normalized phone number.
pub fn profile_url(base_url: &str, phone: &PhoneNumber) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), phone)
}

//! Lookup orchestration: normalize → cache check → fetch → extract → store.

use crate::cache::ResultCache;
use crate::error::LookupError;
use crate::extract::Extractor;
use crate::fetch::{FetchStrategy, FetchedDocument};
use crate::phone::PhoneNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome classification for a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupStatus {
    Exists,
    #[serde(rename = "Not Found")]
    NotFound,
    Unknown,
    Error,
}

/// Immutable result of one lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub phone: PhoneNumber,
    /// Display name; empty when the profile was not found or undetermined.
    pub name: String,
    pub status: LookupStatus,
    /// Which extraction rule fired (diagnostic).
    pub method: String,
    pub timestamp: DateTime<Utc>,
}

/// The lookup pipeline. Constructed once at process start and injected into
/// the HTTP layer — never accessed as ambient global state.
pub struct LookupService {
    cache: ResultCache,
    fetcher: Arc<dyn FetchStrategy>,
    extractor: Extractor,
    country_prefix: String,
    local_prefix: String,
}

impl LookupService {
    pub fn new(
        cache: ResultCache,
        fetcher: Arc<dyn FetchStrategy>,
        extractor: Extractor,
        country_prefix: &str,
        local_prefix: &str,
    ) -> Self {
        Self {
            cache,
            fetcher,
            extractor,
            country_prefix: country_prefix.to_string(),
            local_prefix: local_prefix.to_string(),
        }
    }

    pub fn normalize(&self, raw: &str) -> PhoneNumber {
        PhoneNumber::normalize(raw, &self.country_prefix, &self.local_prefix)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Run the full pipeline for one request.
    ///
    /// Two concurrent misses for the same number may both fetch and both
    /// store (last write wins) — results converge, so no per-phone lock is
    /// taken. Fetch failures surface as `Err` and are never cached; Not
    /// Found and Unknown outcomes are cached like positive hits.
    pub async fn lookup(&self, raw: &str) -> Result<LookupResult, LookupError> {
        let phone = self.normalize(raw);

        if let Some(hit) = self.cache.get(&phone).await {
            info!("cache hit for {phone}");
            return Ok(hit);
        }

        info!("cache miss for {phone}, fetching via {}", self.fetcher.name());
        let doc = self
            .fetcher
            .fetch(&phone)
            .await
            .map_err(|source| LookupError::Fetch {
                phone: phone.to_string(),
                source,
            })?;

        let extraction = self.extractor.extract(&doc);
        debug!(
            "extracted for {phone}: status={:?} method={}",
            extraction.status, extraction.method
        );

        let result = LookupResult {
            phone: phone.clone(),
            name: extraction.name,
            status: extraction.status,
            method: extraction.method,
            timestamp: Utc::now(),
        };

        self.cache.put(phone, result.clone()).await;
        Ok(result)
    }

    /// Fetch the raw document without extraction. Backs the debug endpoint.
    pub async fn fetch_raw(&self, raw: &str) -> Result<FetchedDocument, LookupError> {
        let phone = self.normalize(raw);
        self.fetcher
            .fetch(&phone)
            .await
            .map_err(|source| LookupError::Fetch {
                phone: phone.to_string(),
                source,
            })
    }
}

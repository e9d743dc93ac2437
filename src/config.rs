//! Environment-driven configuration.
//!
//! Every knob has a sensible default and can be overridden via environment
//! variables; the CLI overrides port and strategy on top of that.

use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BASE_URL: &str = "https://zalo.me";
const DEFAULT_CACHE_TTL_SECS: u64 = 6 * 60 * 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RENDER_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_SETTLE_MS: u64 = 4_000;
const DEFAULT_COUNTRY_PREFIX: &str = "+84";
const DEFAULT_LOCAL_PREFIX: &str = "0";
const DEFAULT_BRAND: &str = "Zalo";

/// Which fetch strategy obtains the remote document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategyKind {
    /// Plain HTTP GET, no script execution.
    Static,
    /// Headless-browser render, one isolated session per request.
    Rendered,
}

impl FetchStrategyKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Some(Self::Static),
            "rendered" => Some(Self::Rendered),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Rendered => "rendered",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port.
    pub port: u16,
    /// Base URL of the profile site; the normalized phone number is appended
    /// as the path.
    pub base_url: String,
    pub strategy: FetchStrategyKind,
    pub cache_ttl: Duration,
    pub sweep_interval: Duration,
    /// Hard timeout for a static fetch.
    pub fetch_timeout_ms: u64,
    /// Navigation timeout for a rendered fetch.
    pub render_timeout_ms: u64,
    /// Fixed delay after navigation settles, letting client-side rendering
    /// finish before the DOM snapshot.
    pub settle_ms: u64,
    pub country_prefix: String,
    pub local_prefix: String,
    /// The site's own brand string, excluded as a name candidate.
    pub brand: String,
    /// Body phrases that confidently signal a missing account.
    pub not_found_phrases: Vec<String>,
    /// DOM selectors probed for the profile name on rendered documents.
    pub name_selectors: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            base_url: DEFAULT_BASE_URL.to_string(),
            strategy: FetchStrategyKind::Static,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            render_timeout_ms: DEFAULT_RENDER_TIMEOUT_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            country_prefix: DEFAULT_COUNTRY_PREFIX.to_string(),
            local_prefix: DEFAULT_LOCAL_PREFIX.to_string(),
            brand: DEFAULT_BRAND.to_string(),
            not_found_phrases: default_not_found_phrases(),
            name_selectors: default_name_selectors(),
        }
    }
}

/// Phrase list observed on missing / search-disallowed profiles. A default
/// configuration, not a hard-coded constant — override with
/// `ZALO_PROXY_NOT_FOUND_PHRASES` (`|`-separated).
pub fn default_not_found_phrases() -> Vec<String> {
    vec![
        "Tài khoản này không tồn tại".to_string(),
        "không cho phép tìm kiếm".to_string(),
    ]
}

/// Selector conventions the profile page has used for the display name,
/// most specific first.
pub fn default_name_selectors() -> Vec<String> {
    vec![
        "h1.main__name".to_string(),
        ".main__name".to_string(),
        "h1[class*=\"name\"]".to_string(),
        "[class*=\"card-name\"]".to_string(),
    ]
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let d = Config::default();
        let cfg = Self {
            port: read_env_u16("PORT", d.port),
            base_url: read_env_string("ZALO_PROXY_BASE_URL").unwrap_or(d.base_url),
            strategy: read_env_string("ZALO_PROXY_STRATEGY")
                .and_then(|s| FetchStrategyKind::parse(&s))
                .unwrap_or(d.strategy),
            cache_ttl: Duration::from_secs(read_env_u64(
                "ZALO_PROXY_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )),
            sweep_interval: Duration::from_secs(
                read_env_u64("ZALO_PROXY_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS).max(1),
            ),
            fetch_timeout_ms: read_env_u64("ZALO_PROXY_FETCH_TIMEOUT_MS", d.fetch_timeout_ms),
            render_timeout_ms: read_env_u64("ZALO_PROXY_RENDER_TIMEOUT_MS", d.render_timeout_ms),
            settle_ms: read_env_u64("ZALO_PROXY_SETTLE_MS", d.settle_ms),
            country_prefix: read_env_string("ZALO_PROXY_COUNTRY_PREFIX")
                .unwrap_or(d.country_prefix),
            local_prefix: read_env_string("ZALO_PROXY_LOCAL_PREFIX").unwrap_or(d.local_prefix),
            brand: read_env_string("ZALO_PROXY_BRAND").unwrap_or(d.brand),
            not_found_phrases: read_env_list("ZALO_PROXY_NOT_FOUND_PHRASES")
                .unwrap_or(d.not_found_phrases),
            name_selectors: read_env_list("ZALO_PROXY_NAME_SELECTORS")
                .unwrap_or(d.name_selectors),
        };

        url::Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid base URL: {}", cfg.base_url))?;

        Ok(cfg)
    }
}

fn read_env_u64(name: &str, default_value: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_value)
}

fn read_env_u16(name: &str, default_value: u16) -> u16 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(default_value)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_env_list(name: &str) -> Option<Vec<String>> {
    read_env_string(name).map(|v| {
        v.split('|')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.base_url, "https://zalo.me");
        assert_eq!(cfg.strategy, FetchStrategyKind::Static);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(6 * 60 * 60));
        assert_eq!(cfg.sweep_interval, Duration::from_secs(60 * 60));
        assert_eq!(cfg.country_prefix, "+84");
        assert_eq!(cfg.local_prefix, "0");
        assert_eq!(cfg.not_found_phrases.len(), 2);
        assert_eq!(cfg.name_selectors.len(), 4);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            FetchStrategyKind::parse("static"),
            Some(FetchStrategyKind::Static)
        );
        assert_eq!(
            FetchStrategyKind::parse(" Rendered "),
            Some(FetchStrategyKind::Rendered)
        );
        assert_eq!(FetchStrategyKind::parse("puppeteer"), None);
    }

    // Single test for all env interaction: cargo runs tests in parallel and
    // process env is shared.
    #[test]
    fn test_env_overrides() {
        std::env::set_var("ZALO_PROXY_CACHE_TTL_SECS", "120");
        std::env::set_var("ZALO_PROXY_NOT_FOUND_PHRASES", "gone|not here");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.cache_ttl, Duration::from_secs(120));
        assert_eq!(cfg.not_found_phrases, vec!["gone", "not here"]);
        std::env::remove_var("ZALO_PROXY_CACHE_TTL_SECS");
        std::env::remove_var("ZALO_PROXY_NOT_FOUND_PHRASES");

        std::env::set_var("ZALO_PROXY_BASE_URL", "not a url");
        let result = Config::from_env();
        std::env::remove_var("ZALO_PROXY_BASE_URL");
        assert!(result.is_err());
    }
}

//! Layered name extraction from a fetched profile document.
//!
//! Rules run in strict priority order; the first rule that yields a
//! plausible name, or that confidently signals a missing account, wins and
//! is never overridden by a later rule. The ordering encodes observed
//! reliability: the site sets a per-profile `<title>` even before client
//! scripts run, structured selectors only exist after a render, and meta
//! tags are the weakest fallback.
//!
//! Extraction is pure and synchronous. `scraper` types are not `Send`, so
//! they must never be held across an await point — keeping this module free
//! of async code sidesteps the problem entirely.

pub mod rules;

use crate::config::Config;
use crate::fetch::FetchedDocument;
use crate::lookup::LookupStatus;

/// A name/status guess produced by one extraction rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub name: String,
    pub status: LookupStatus,
    /// Which rule fired, for diagnostics.
    pub method: String,
}

/// One extraction rule: a pure function from a fetched document to an
/// optional guess.
pub trait ExtractionRule: Send + Sync {
    /// Rule name for logs.
    fn name(&self) -> &'static str;

    fn apply(&self, doc: &FetchedDocument) -> Option<Extraction>;
}

/// A pluggable ordered rule chain.
pub struct Extractor {
    rules: Vec<Box<dyn ExtractionRule>>,
}

impl Extractor {
    pub fn new(rules: Vec<Box<dyn ExtractionRule>>) -> Self {
        Self { rules }
    }

    /// The default chain: title tag, rendered selectors, not-found phrases,
    /// `og:title`, meta description. Phrase and selector lists come from
    /// configuration so they can be extended without touching this module.
    pub fn with_defaults(config: &Config) -> Self {
        Self::new(vec![
            Box::new(rules::TitleRule::new(&config.brand)),
            Box::new(rules::SelectorRule::new(config.name_selectors.clone())),
            Box::new(rules::NotFoundRule::new(config.not_found_phrases.clone())),
            Box::new(rules::MetaOgTitleRule::new(&config.brand)),
            Box::new(rules::MetaDescriptionRule::new(&config.brand)),
        ])
    }

    /// Apply the chain and return the first hit, or the Unknown fallback.
    pub fn extract(&self, doc: &FetchedDocument) -> Extraction {
        for rule in &self.rules {
            if let Some(hit) = rule.apply(doc) {
                tracing::debug!("extraction rule '{}' fired: {:?}", rule.name(), hit.status);
                return hit;
            }
        }

        Extraction {
            name: String::new(),
            status: LookupStatus::Unknown,
            method: "none".to_string(),
        }
    }
}

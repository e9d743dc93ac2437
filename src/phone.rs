//! Phone number normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized phone number: whitespace stripped, the configured
/// international prefix rewritten to the local leading digit.
///
/// Used as the cache key and for profile URL construction. Normalization is
/// permissive — it never rejects malformed input, matching the target site's
/// own lenient URL routing — and idempotent: normalizing an already
/// normalized number yields the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Canonicalize raw input. `country_prefix` (e.g. `+84`) at the start of
    /// the number is rewritten to `local_prefix` (e.g. `0`).
    pub fn normalize(raw: &str, country_prefix: &str, local_prefix: &str) -> Self {
        let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let canonical = match stripped.strip_prefix(country_prefix) {
            Some(rest) => format!("{local_prefix}{rest}"),
            None => stripped,
        };
        Self(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> PhoneNumber {
        PhoneNumber::normalize(raw, "+84", "0")
    }

    #[test]
    fn test_international_prefix_rewritten() {
        assert_eq!(normalize("+84398981698"), normalize("0398981698"));
        assert_eq!(normalize("+84398981698").as_str(), "0398981698");
    }

    #[test]
    fn test_whitespace_stripped() {
        assert_eq!(normalize(" 039 898 1698 ").as_str(), "0398981698");
        assert_eq!(normalize("+84\t398 981 698").as_str(), "0398981698");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["+84398981698", "0398981698", "  039 898 1698", "garbage"] {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_permissive_on_malformed_input() {
        // Normalization never rejects; the site's routing is just as lenient.
        assert_eq!(normalize("abc").as_str(), "abc");
        assert_eq!(normalize("").as_str(), "");
        assert_eq!(normalize("+8412").as_str(), "012");
    }

    #[test]
    fn test_prefix_only_rewritten_at_start() {
        assert_eq!(normalize("012+8434").as_str(), "012+8434");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&normalize("+84398981698")).unwrap();
        assert_eq!(json, "\"0398981698\"");
    }
}

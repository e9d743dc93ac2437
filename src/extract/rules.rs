//! The default extraction rules.

use super::{Extraction, ExtractionRule};
use crate::fetch::FetchedDocument;
use crate::lookup::LookupStatus;
use scraper::{Html, Selector};

/// Split a title-style string on `" - "` and return the first part that is a
/// plausible name: non-empty after stripping the brand, longer than one
/// character, and not the brand itself.
fn candidate_from_split(text: &str, brand: &str) -> Option<String> {
    if !text.contains(" - ") {
        return None;
    }
    for part in text.split(" - ") {
        let cleaned = part.replace(brand, "");
        let cleaned = cleaned.trim();
        if cleaned.chars().count() > 1 && !cleaned.eq_ignore_ascii_case(brand) {
            return Some(cleaned.to_string());
        }
    }
    None
}

fn first_attr(html: &str, selector: &str, attr: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.to_string())
}

/// Rule 1: the document title. Most reliable — the site populates a
/// per-profile title even when the body is client-rendered.
pub struct TitleRule {
    brand: String,
}

impl TitleRule {
    pub fn new(brand: &str) -> Self {
        Self {
            brand: brand.to_string(),
        }
    }
}

impl ExtractionRule for TitleRule {
    fn name(&self) -> &'static str {
        "title"
    }

    fn apply(&self, doc: &FetchedDocument) -> Option<Extraction> {
        let document = Html::parse_document(&doc.html);
        let sel = Selector::parse("title").ok()?;
        let title: String = document.select(&sel).next()?.text().collect();

        candidate_from_split(title.trim(), &self.brand).map(|name| Extraction {
            name,
            status: LookupStatus::Exists,
            method: "title".to_string(),
        })
    }
}

/// Rule 2: structured DOM selectors. Only meaningful on rendered documents —
/// the matching elements are created by client-side scripts.
pub struct SelectorRule {
    selectors: Vec<String>,
}

impl SelectorRule {
    pub fn new(selectors: Vec<String>) -> Self {
        Self { selectors }
    }
}

impl ExtractionRule for SelectorRule {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn apply(&self, doc: &FetchedDocument) -> Option<Extraction> {
        if !doc.rendered {
            return None;
        }
        let document = Html::parse_document(&doc.html);
        for raw in &self.selectors {
            let Ok(sel) = Selector::parse(raw) else {
                tracing::warn!("skipping unparsable name selector: {raw}");
                continue;
            };
            if let Some(el) = document.select(&sel).next() {
                let text = el.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    return Some(Extraction {
                        name: text,
                        // The matched selector is the diagnostic here, not
                        // the generic rule name.
                        method: raw.clone(),
                        status: LookupStatus::Exists,
                    });
                }
            }
        }
        None
    }
}

/// Rule 3: phrases that confidently signal a missing or unsearchable
/// account. Scanned case-insensitively over the whole body.
pub struct NotFoundRule {
    phrases: Vec<String>,
}

impl NotFoundRule {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }
}

impl ExtractionRule for NotFoundRule {
    fn name(&self) -> &'static str {
        "not-found"
    }

    fn apply(&self, doc: &FetchedDocument) -> Option<Extraction> {
        let body = doc.html.to_lowercase();
        for phrase in &self.phrases {
            if body.contains(&phrase.to_lowercase()) {
                return Some(Extraction {
                    name: String::new(),
                    status: LookupStatus::NotFound,
                    method: "not-found".to_string(),
                });
            }
        }
        None
    }
}

/// Rule 4: the `og:title` meta tag, with the same split/clean logic as the
/// title rule.
pub struct MetaOgTitleRule {
    brand: String,
}

impl MetaOgTitleRule {
    pub fn new(brand: &str) -> Self {
        Self {
            brand: brand.to_string(),
        }
    }
}

impl ExtractionRule for MetaOgTitleRule {
    fn name(&self) -> &'static str {
        "meta-og-title"
    }

    fn apply(&self, doc: &FetchedDocument) -> Option<Extraction> {
        let content = first_attr(&doc.html, "meta[property=\"og:title\"]", "content")?;
        candidate_from_split(content.trim(), &self.brand).map(|name| Extraction {
            name,
            status: LookupStatus::Exists,
            method: "meta-og-title".to_string(),
        })
    }
}

/// Rule 5: the `description` meta tag — the substring following
/// `"<brand> - "`. Weakest signal, tried last.
pub struct MetaDescriptionRule {
    brand: String,
}

impl MetaDescriptionRule {
    pub fn new(brand: &str) -> Self {
        Self {
            brand: brand.to_string(),
        }
    }
}

impl ExtractionRule for MetaDescriptionRule {
    fn name(&self) -> &'static str {
        "meta-description"
    }

    fn apply(&self, doc: &FetchedDocument) -> Option<Extraction> {
        let content = first_attr(&doc.html, "meta[name=\"description\"]", "content")?;
        let marker = format!("{} - ", self.brand);
        let rest = content.split_once(&marker)?.1.trim();
        if rest.chars().count() > 1 {
            Some(Extraction {
                name: rest.to_string(),
                status: LookupStatus::Exists,
                method: "meta-description".to_string(),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_name_selectors, default_not_found_phrases};

    fn doc(html: &str, rendered: bool) -> FetchedDocument {
        FetchedDocument {
            url: "https://zalo.me/0398981698".to_string(),
            html: html.to_string(),
            rendered,
        }
    }

    #[test]
    fn test_candidate_from_split() {
        assert_eq!(
            candidate_from_split("Target Name - Zalo", "Zalo"),
            Some("Target Name".to_string())
        );
        // Brand-first titles work too.
        assert_eq!(
            candidate_from_split("Zalo - Ngọc Anh", "Zalo"),
            Some("Ngọc Anh".to_string())
        );
        // No separator, brand-only, or single-character parts yield nothing.
        assert_eq!(candidate_from_split("Zalo", "Zalo"), None);
        assert_eq!(candidate_from_split("Zalo - Zalo", "Zalo"), None);
        assert_eq!(candidate_from_split("a - Zalo", "Zalo"), None);
    }

    #[test]
    fn test_title_rule() {
        let rule = TitleRule::new("Zalo");
        let hit = rule
            .apply(&doc(
                "<html><head><title>Target Name - Zalo</title></head></html>",
                false,
            ))
            .unwrap();
        assert_eq!(hit.name, "Target Name");
        assert_eq!(hit.method, "title");

        assert!(rule
            .apply(&doc("<html><head><title>Zalo</title></head></html>", false))
            .is_none());
        assert!(rule.apply(&doc("<html><body></body></html>", false)).is_none());
    }

    #[test]
    fn test_selector_rule_requires_rendered_doc() {
        let rule = SelectorRule::new(default_name_selectors());
        let html = "<html><body><h1 class=\"main__name\"> Ngọc Anh </h1></body></html>";

        assert!(rule.apply(&doc(html, false)).is_none());

        let hit = rule.apply(&doc(html, true)).unwrap();
        assert_eq!(hit.name, "Ngọc Anh");
        assert_eq!(hit.method, "h1.main__name");
    }

    #[test]
    fn test_selector_rule_probes_in_order() {
        let rule = SelectorRule::new(default_name_selectors());
        let html = "<html><body><div class=\"card-name\">Fallback Name</div></body></html>";
        let hit = rule.apply(&doc(html, true)).unwrap();
        assert_eq!(hit.name, "Fallback Name");
        assert_eq!(hit.method, "[class*=\"card-name\"]");
    }

    #[test]
    fn test_not_found_rule_case_insensitive() {
        let rule = NotFoundRule::new(default_not_found_phrases());
        let hit = rule
            .apply(&doc("<body>TÀI KHOẢN NÀY KHÔNG TỒN TẠI</body>", false))
            .unwrap();
        assert_eq!(hit.status, LookupStatus::NotFound);
        assert_eq!(hit.name, "");

        assert!(rule.apply(&doc("<body>all good</body>", false)).is_none());
    }

    #[test]
    fn test_meta_og_title_rule() {
        let rule = MetaOgTitleRule::new("Zalo");
        let html = "<html><head>\
                    <meta property=\"og:title\" content=\"Zalo - Target Name\">\
                    </head></html>";
        let hit = rule.apply(&doc(html, false)).unwrap();
        assert_eq!(hit.name, "Target Name");
        assert_eq!(hit.method, "meta-og-title");
    }

    #[test]
    fn test_meta_description_rule() {
        let rule = MetaDescriptionRule::new("Zalo");
        let html = "<html><head>\
                    <meta name=\"description\" content=\"Zalo - Target Name trên Zalo\">\
                    </head></html>";
        let hit = rule.apply(&doc(html, false)).unwrap();
        assert_eq!(hit.name, "Target Name trên Zalo");

        let no_marker = "<html><head>\
                         <meta name=\"description\" content=\"chat app\">\
                         </head></html>";
        assert!(rule.apply(&doc(no_marker, false)).is_none());
    }
}

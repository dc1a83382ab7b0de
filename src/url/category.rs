use serde::Serialize;

const NEWS_MARKERS: &[&str] = &["news", "cnn", "bbc", "reuters", "bloomberg"];
const ACADEMIC_MARKERS: &[&str] = &[".edu", "arxiv", "scholar", "research"];
const COMMERCE_MARKERS: &[&str] = &["shop", "store", "amazon", "ebay"];
const SOCIAL_MARKERS: &[&str] = &["twitter", "linkedin", "facebook", "reddit"];

/// Coarse site categories derived from a host name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlCategory {
    News,
    Academic,
    Commerce,
    Social,
}

impl UrlCategory {
    fn markers(&self) -> &'static [&'static str] {
        match self {
            Self::News => NEWS_MARKERS,
            Self::Academic => ACADEMIC_MARKERS,
            Self::Commerce => COMMERCE_MARKERS,
            Self::Social => SOCIAL_MARKERS,
        }
    }
}

/// Category hints for one host; several may be true at once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryHints {
    pub news_site: bool,
    pub academic: bool,
    pub ecommerce: bool,
    pub social: bool,
}

impl CategoryHints {
    pub fn contains(&self, category: UrlCategory) -> bool {
        match category {
            UrlCategory::News => self.news_site,
            UrlCategory::Academic => self.academic,
            UrlCategory::Commerce => self.ecommerce,
            UrlCategory::Social => self.social,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.news_site || self.academic || self.ecommerce || self.social)
    }
}

/// Classifies a host by static substring heuristics
///
/// Purely local and deterministic: the same host always yields the same hints.
///
/// # Examples
///
/// ```
/// use adaptive_crawler::url::{classify_host, UrlCategory};
///
/// let hints = classify_host("www.bbc.co.uk");
/// assert!(hints.contains(UrlCategory::News));
/// assert!(!hints.contains(UrlCategory::Commerce));
/// ```
pub fn classify_host(host: &str) -> CategoryHints {
    let host = host.to_lowercase();
    let matches = |category: UrlCategory| category.markers().iter().any(|m| host.contains(m));

    CategoryHints {
        news_site: matches(UrlCategory::News),
        academic: matches(UrlCategory::Academic),
        ecommerce: matches(UrlCategory::Commerce),
        social: matches(UrlCategory::Social),
    }
}

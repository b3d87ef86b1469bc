//! Query-string builder for API v4 list endpoints
//!
//! Pairs are kept in insertion order and rendered with amoCRM's bracketed
//! filter syntax (`filter[id][]=1`, `filter[updated_at][from]=...`).

use amocrm_domain::constants::MAX_PAGE_SIZE;
use amocrm_domain::SortDirection;

/// Ordered list of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Page number (1-based).
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.set_page(page);
        self
    }

    /// Page size, clamped to `1..=250`.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.set("limit", limit.clamp(1, MAX_PAGE_SIZE).to_string());
        self
    }

    /// Full-text search across entity fields.
    #[must_use]
    pub fn query(mut self, term: impl Into<String>) -> Self {
        self.set("query", term.into());
        self
    }

    /// Extra related data, sent as a single comma-separated `with`.
    #[must_use]
    pub fn with<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let joined =
            values.into_iter().map(|v| v.as_ref().to_owned()).collect::<Vec<_>>().join(",");
        if !joined.is_empty() {
            self.set("with", joined);
        }
        self
    }

    /// `filter[key]=value`
    #[must_use]
    pub fn filter(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((format!("filter[{key}]"), value.to_string()));
        self
    }

    /// `filter[key][]=v` for every value
    #[must_use]
    pub fn filter_any<I, T>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        for value in values {
            self.pairs.push((format!("filter[{key}][]"), value.to_string()));
        }
        self
    }

    /// `filter[key][from]` and/or `filter[key][to]`
    #[must_use]
    pub fn filter_range(mut self, key: &str, from: Option<i64>, to: Option<i64>) -> Self {
        if let Some(from) = from {
            self.pairs.push((format!("filter[{key}][from]"), from.to_string()));
        }
        if let Some(to) = to {
            self.pairs.push((format!("filter[{key}][to]"), to.to_string()));
        }
        self
    }

    /// `order[key]=asc|desc`
    #[must_use]
    pub fn order(mut self, key: &str, direction: SortDirection) -> Self {
        self.set(&format!("order[{key}]"), direction.as_str().to_owned());
        self
    }

    /// Replace the page number in place.
    pub fn set_page(&mut self, page: u32) {
        self.set("page", page.max(1).to_string());
    }

    /// Page number currently set, if any.
    #[must_use]
    pub fn current_page(&self) -> Option<u32> {
        self.get("page").and_then(|p| p.parse().ok())
    }

    #[must_use]
    pub fn has_limit(&self) -> bool {
        self.get("limit").is_some()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in insertion order, ready for URL encoding.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    fn set(&mut self, key: &str, value: String) {
        if let Some(slot) = self.pairs.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.pairs.push((key.to_owned(), value));
        }
    }
}

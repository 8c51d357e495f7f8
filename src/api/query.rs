//! Query Strings
//!
//! Builder for the form-encoded query strings the `/api/2.0/fo/` and `/msp/`
//! endpoints take in place of a request body.

use url::form_urlencoded;

/// Ordered set of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the `action` parameter most endpoints require
    pub fn action(action: impl Into<String>) -> Self {
        Self::new().param("action", action)
    }

    /// Add a parameter (repeated keys are kept)
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Add a parameter only when `value` is non-empty
    pub fn non_empty(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        if value.is_empty() {
            self
        } else {
            self.param(key, value)
        }
    }

    /// Add a parameter only when `value` is present
    pub fn optional<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value.to_string()),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Form-encode the parameters, sorted by key
    pub fn encode(&self) -> String {
        let mut pairs: Vec<_> = self.pairs.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs.into_iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish()
    }

    /// Append the encoded parameters to `path`
    pub fn to_path(&self, path: &str) -> String {
        if self.is_empty() {
            return path.to_string();
        }
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", path, separator, self.encode())
    }
}

//! Request parameters
//!
//! GET calls carry flat `key=value` pairs in the query string. POST and PUT
//! calls carry either the same pairs form-encoded, or a pre-serialized JSON
//! document.

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Flat mapping of parameter names to scalar values.
///
/// # Example
///
/// ```
/// use buckybox::QueryParams;
///
/// let params = QueryParams::new().with("embed", "images").with("page", 2);
/// assert_eq!(params.to_query(), "embed=images&page=2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: BTreeMap<String, String>,
}

impl QueryParams {
    /// No parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Add (or replace) a parameter in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.insert(key.into(), value.to_string());
    }

    /// Value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Canonical query string.
    ///
    /// Keys and values are form-URL-escaped, each `key=value` pair is built,
    /// the pairs are sorted lexicographically and joined with `&`. No
    /// parameters give an empty string. Insertion order never matters.
    pub fn to_query(&self) -> String {
        let mut pairs: Vec<String> = self
            .pairs
            .iter()
            .map(|(key, value)| format!("{}={}", escape(key), escape(value)))
            .collect();
        pairs.sort_unstable();
        pairs.join("&")
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn escape(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Parameters of one logical call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// Flat pairs: query string on GET, form body otherwise.
    Pairs(QueryParams),
    /// A JSON document sent verbatim as the request body.
    Json(String),
}

impl Params {
    /// No parameters.
    pub fn none() -> Self {
        Params::Pairs(QueryParams::new())
    }

    /// Canonical query string for pairs; JSON bodies have none.
    pub fn query(&self) -> Option<String> {
        match self {
            Params::Pairs(pairs) => Some(pairs.to_query()),
            Params::Json(_) => None,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::none()
    }
}

impl From<QueryParams> for Params {
    fn from(pairs: QueryParams) -> Self {
        Params::Pairs(pairs)
    }
}

//! Fetch targets and their supporting types
//!
//! A [`Request`] describes one fetch: URL, query parameters, headers, and an
//! optional render flag for transports that can drive a JavaScript renderer.
//! Requests are built by the caller (or by a parse callback discovering
//! links) and handed to the spider; once dispatched they should be treated as
//! frozen.

use std::collections::HashMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched by [`url_encode`]: RFC 3986 unreserved
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a query-string key or value
///
/// Spaces become `%20`, never `+`.
pub fn url_encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY).to_string()
}

/// Decode a percent-encoded string
///
/// Bytes that do not form valid UTF-8 after decoding are replaced.
pub fn url_decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Case-insensitive string map used for request and response headers
///
/// Keys are normalized to lowercase on insert, so `get("Content-Type")` and
/// `get("content-type")` are equivalent and two maps built with different key
/// casing compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any existing value for the same key
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.map.insert(key.as_ref().to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(key, value)` pairs; keys are lowercase
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// One fetch target: URL plus query parameters, headers, and render flag
///
/// Two requests are equal iff URL, parameters, headers, and render flag are
/// all equal; map insertion order does not matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    url: String,
    parameters: HashMap<String, String>,
    headers: Headers,
    render: bool,
}

impl Request {
    /// Create a request for a bare URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Create a request with query parameters
    pub fn with_parameters(url: impl Into<String>, parameters: HashMap<String, String>) -> Self {
        Self {
            url: url.into(),
            parameters,
            ..Self::default()
        }
    }

    /// Create a request with headers
    pub fn with_headers(url: impl Into<String>, headers: Headers) -> Self {
        Self {
            url: url.into(),
            headers,
            ..Self::default()
        }
    }

    /// Add a query parameter
    ///
    /// Only safe before the request is handed to the spider.
    pub fn add_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(key.into(), value.into());
    }

    /// Add a header
    ///
    /// Only safe before the request is handed to the spider.
    pub fn add_header(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.headers.insert(key, value);
    }

    /// Mark the request for JavaScript rendering
    ///
    /// The default HTTP transport ignores this; render-capable transports may
    /// honor it.
    pub fn set_render(&mut self, render: bool) {
        self.render = render;
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn render(&self) -> bool {
        self.render
    }

    /// The URL the transport actually fetches: base URL plus the
    /// percent-encoded query string
    ///
    /// Pairs are encoded as `key=value` and joined with `&`. A request
    /// without parameters yields the base URL unchanged.
    pub fn full_url(&self) -> String {
        if self.parameters.is_empty() {
            return self.url.clone();
        }
        let query = self
            .parameters
            .iter()
            .map(|(key, value)| format!("{}={}", url_encode(key), url_encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.url, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_replaces_spaces_with_percent_20() {
        assert_eq!(url_encode("some key"), "some%20key");
        assert_eq!(url_encode("safe-chars_.~"), "safe-chars_.~");
    }

    #[test]
    fn decode_reverses_encode() {
        let original = "a value/with spaces&symbols=?";
        assert_eq!(url_decode(&url_encode(original)), original);
    }

    #[test]
    fn headers_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
        assert!(headers.contains("Content-type"));
    }
}

//! The outcome of executing a [`Request`](crate::Request)
//!
//! A [`Response`] is always produced, even when the transport fails at the
//! network level; in that case [`Response::error`] is set and the remaining
//! fields are zero/empty. Typed views of the body (`json()`, `html()`) are
//! checked against the declared content type at the point they are requested,
//! never at fetch time.

use std::time::Duration;

use crate::error::{ResponseError, TransportError};
use crate::html::Document;
use crate::request::Headers;

/// Media types accepted by [`Response::html`]
const HTML_CONTENT_TYPES: [&str; 3] = ["text/html", "application/xhtml+xml", "multipart/related"];

/// The result of one fetch
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// HTTP status code; 0 when the exchange never completed
    pub status_code: u16,
    /// Body text
    pub text: String,
    /// Response headers (case-insensitive lookup)
    pub headers: Headers,
    /// Final URL after redirects
    pub url: String,
    /// Wall time of the exchange
    pub elapsed: Duration,
    /// Network-level failure, if any; the response is still delivered
    pub error: Option<TransportError>,
    /// Raw header block as received
    pub raw_header: String,
    /// Number of redirects followed
    pub redirect_count: u32,
    /// Bytes sent in the request body
    pub uploaded_bytes: u64,
    /// Bytes received in the response body
    pub downloaded_bytes: u64,
}

impl Response {
    /// Build a response for an exchange that failed at the network level
    ///
    /// Status is 0 and the body is empty; the parse callback still runs.
    pub fn from_error(url: impl Into<String>, message: impl Into<String>, elapsed: Duration) -> Self {
        let url = url.into();
        Self {
            error: Some(TransportError::new(url.clone(), message)),
            url,
            elapsed,
            ..Self::default()
        }
    }

    /// Whether the exchange completed without a transport error
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }

    /// Parse the body as JSON
    ///
    /// Fails with [`ResponseError::InvalidJson`] unless the `Content-Type`
    /// header names a JSON media type (covers both `application/json` and
    /// `application/ld+json`). The parser tolerates comments and trailing
    /// commas.
    pub fn json(&self) -> Result<serde_json::Value, ResponseError> {
        let content_type = self.headers.get("Content-Type").unwrap_or("");
        if !content_type.contains("json") {
            return Err(ResponseError::InvalidJson {
                url: self.url.clone(),
                content_type: content_type.to_string(),
            });
        }
        json5::from_str(&self.text).map_err(|error| ResponseError::MalformedJson {
            url: self.url.clone(),
            error: error.to_string(),
        })
    }

    /// Parse the body as an HTML document
    ///
    /// Fails with [`ResponseError::InvalidContentType`] unless the
    /// `Content-Type` header names an HTML media type.
    pub fn html(&self) -> Result<Document, ResponseError> {
        let content_type = self.headers.get("Content-Type").unwrap_or("");
        if !HTML_CONTENT_TYPES.iter().any(|t| content_type.contains(t)) {
            return Err(ResponseError::InvalidContentType {
                url: self.url.clone(),
                content_type: content_type.to_string(),
            });
        }
        Ok(Document::parse(&self.text))
    }

    /// Parse the body as HTML without checking the content type
    pub fn html_unchecked(&self) -> Document {
        Document::parse(&self.text)
    }
}

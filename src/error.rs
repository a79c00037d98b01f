//! Error types for the crawling toolkit
//!
//! Transport failures are not represented here as control flow: they travel
//! inside [`Response`](crate::Response) as a [`TransportError`] value so the
//! parse callback always runs. The types below cover the remaining cases,
//! which are programmer mistakes surfaced at the point of misuse (requesting
//! the wrong typed view, looking up a missing attribute, building a spider
//! with an invalid configuration).

/// Errors that can occur while building a [`Spider`](crate::Spider)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Worker count must be greater than 0
    #[error("worker count must be greater than 0, got {0}")]
    InvalidWorkerCount(usize),
}

/// A network-level failure captured inside a [`Response`](crate::Response)
///
/// Connection, DNS, and TLS failures are data, not faults: the dispatcher
/// still delivers a response (with this error set) to the parse callback.
#[derive(Debug, Clone, thiserror::Error)]
#[error("transport error for {url}: {message}")]
pub struct TransportError {
    /// The URL the failed exchange was addressed to
    pub url: String,
    /// Human-readable description from the transport
    pub message: String,
}

impl TransportError {
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Errors raised when a typed view of a [`Response`](crate::Response) is requested
///
/// The raw response is always usable regardless of content type; these fire
/// only when the caller asks for a view the response cannot provide.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// The response does not declare a JSON media type
    #[error("response to {url} is not JSON (Content-Type: {content_type})")]
    InvalidJson { url: String, content_type: String },

    /// The body declared a JSON media type but failed to parse
    #[error("response to {url} is not valid JSON: {error}")]
    MalformedJson { url: String, error: String },

    /// The response does not declare an HTML media type
    #[error("response to {url} does not have an HTML content-type (Content-Type: {content_type})")]
    InvalidContentType { url: String, content_type: String },
}

/// Errors raised by HTML element lookups
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    /// The requested attribute does not exist on the element
    ///
    /// Callers that need a non-failing lookup should use
    /// [`Element::has_attribute`](crate::html::Element::has_attribute) first.
    #[error("element has no attribute named '{name}'")]
    AttributeNotFound { name: String },
}

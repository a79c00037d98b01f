//! The fetch boundary: a trait for executing requests, and the default
//! `reqwest`-backed implementation
//!
//! A transport always returns a [`Response`], never an error: network-level
//! failures are captured inside the response so the parse stage runs for
//! every dispatched request.

use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::request::{Headers, Request};
use crate::response::Response;

/// Executes one HTTP exchange for a [`Request`]
///
/// Implementations must not fail: connection, DNS, and TLS errors are
/// reported through [`Response::error`]. Timeouts, redirect policy, and
/// connection pooling all belong here, not in the orchestrator.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> Response;
}

/// Default transport over a shared [`reqwest::Client`]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Wrap an already-configured client (custom timeouts, proxy, redirect
    /// policy)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn header_map(request: &Request) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (key, value) in request.headers().iter() {
            match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => {
                    log::warn!("skipping invalid header '{key}' on request to {}", request.url());
                }
            }
        }
        map
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Response {
        let started = Instant::now();
        let url = request.full_url();

        let result = self
            .client
            .get(&url)
            .headers(Self::header_map(request))
            .send()
            .await;

        let http_response = match result {
            Ok(response) => response,
            Err(error) => {
                log::debug!("transport failure for {url}: {error}");
                return Response::from_error(url, error.to_string(), started.elapsed());
            }
        };

        let status_code = http_response.status().as_u16();
        let final_url = http_response.url().to_string();

        let mut headers = Headers::new();
        let mut raw_header = String::new();
        for (name, value) in http_response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            raw_header.push_str(&format!("{name}: {value}\r\n"));
            headers.insert(name.as_str(), value);
        }

        match http_response.text().await {
            Ok(text) => Response {
                status_code,
                downloaded_bytes: text.len() as u64,
                text,
                headers,
                url: final_url,
                elapsed: started.elapsed(),
                error: None,
                raw_header,
                redirect_count: 0,
                uploaded_bytes: 0,
            },
            Err(error) => {
                log::debug!("failed reading body from {final_url}: {error}");
                let mut response =
                    Response::from_error(final_url, error.to_string(), started.elapsed());
                response.status_code = status_code;
                response.headers = headers;
                response.raw_header = raw_header;
                response
            }
        }
    }
}

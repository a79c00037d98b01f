//! # scuttle
//!
//! A small concurrent crawling/scraping toolkit. Callers describe fetch
//! targets as [`Request`]s and supply a [`Parser`] callback that receives
//! each fetched [`Response`]; the [`Spider`] handles concurrent dispatch,
//! queuing, and lifecycle control. Requests can be enqueued before a run and
//! during it, including from inside a parse callback that discovers new
//! links.
//!
//! What this crate does **not** do: robots.txt, rate limiting, and
//! visited-URL deduplication are left to the caller; it only orchestrates
//! concurrent execution of the requests it is given.

// Core modules
pub mod error;
pub mod html;
mod queue;
mod request;
mod response;
mod spider;
mod transport;

// Public exports
pub use error::{ConfigError, HtmlError, ResponseError, TransportError};
pub use html::{Document, Element};
pub use queue::RequestQueue;
pub use request::{url_decode, url_encode, Headers, Request};
pub use response::Response;
pub use spider::{Parser, PendingWork, Spider, SpiderBuilder, SpiderHandle};
pub use transport::{HttpTransport, Transport};

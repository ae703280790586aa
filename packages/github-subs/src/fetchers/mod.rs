//! Page fetcher implementations.
//!
//! - `HttpFetcher` - reqwest-backed fetcher with bounded timeouts
//! - `MockFetcher` - canned responses for tests

mod http;
mod mock;

pub use http::{HttpFetcher, HttpFetcherBuilder};
pub use mock::{MockFetchCall, MockFetcher};

// Re-export from traits for convenience
pub use crate::traits::fetcher::{FetchRequest, PageFetcher};

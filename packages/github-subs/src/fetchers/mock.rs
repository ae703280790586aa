//! Mock page fetcher for testing.
//!
//! Serves canned bodies per URL and records every request it receives.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchRequest, PageFetcher};

/// Record of a request made to the mock.
#[derive(Debug, Clone)]
pub struct MockFetchCall {
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub post: bool,
}

#[derive(Debug, Clone)]
enum MockResponse {
    Body(String),
    Status(String),
}

/// Mock fetcher for testing.
///
/// Unknown URLs answer `404 Not Found`. Clones share the same responses and
/// call log.
///
/// # Example
///
/// ```rust
/// use github_subs::fetchers::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_page("https://raw.githubusercontent.com/org/repo/main/a.txt", "api.example.com");
/// ```
#[derive(Default, Clone)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    prefix_responses: Arc<RwLock<Vec<(String, MockResponse)>>>,
    calls: Arc<RwLock<Vec<MockFetchCall>>>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for an exact URL.
    pub fn add_page(&self, url: impl Into<String>, body: impl Into<String>) {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), MockResponse::Body(body.into()));
    }

    /// Answer an exact URL with a non-2xx status line.
    pub fn add_failure(&self, url: impl Into<String>, status: impl Into<String>) {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), MockResponse::Status(status.into()));
    }

    /// Serve `body` for every URL starting with `prefix` (exact URLs win).
    pub fn add_prefix(&self, prefix: impl Into<String>, body: impl Into<String>) {
        self.prefix_responses
            .write()
            .unwrap()
            .push((prefix.into(), MockResponse::Body(body.into())));
    }

    /// Builder form of [`MockFetcher::add_page`].
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.add_page(url, body);
        self
    }

    /// Builder form of [`MockFetcher::add_failure`].
    pub fn with_failure(self, url: impl Into<String>, status: impl Into<String>) -> Self {
        self.add_failure(url, status);
        self
    }

    /// Builder form of [`MockFetcher::add_prefix`].
    pub fn with_prefix(self, prefix: impl Into<String>, body: impl Into<String>) -> Self {
        self.add_prefix(prefix, body);
        self
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<MockFetchCall> {
        self.calls.read().unwrap().clone()
    }

    /// URLs requested, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.calls.read().unwrap().iter().map(|c| c.url.clone()).collect()
    }

    /// Number of requests for URLs starting with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.url.starts_with(prefix))
            .count()
    }

    fn lookup(&self, url: &str) -> Option<MockResponse> {
        if let Some(response) = self.responses.read().unwrap().get(url) {
            return Some(response.clone());
        }
        self.prefix_responses
            .read()
            .unwrap()
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone())
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        self.calls.write().unwrap().push(MockFetchCall {
            url: request.url.clone(),
            headers: request.headers.clone(),
            post: request.is_post(),
        });

        match self.lookup(&request.url) {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                url: request.url.clone(),
                status,
            }),
            None => Err(FetchError::Status {
                url: request.url.clone(),
                status: "404 Not Found".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_name() {
        assert_eq!(MockFetcher::new().name(), "mock");
    }

    #[tokio::test]
    async fn test_mock_serves_pages() {
        let mock = MockFetcher::new()
            .with_page("https://example.com/a", "Page A")
            .with_failure("https://example.com/b", "500 Internal Server Error");

        assert_eq!(mock.fetch_url("https://example.com/a").await.unwrap(), "Page A");

        let err = mock.fetch_url("https://example.com/b").await.unwrap_err();
        assert_eq!(err.to_string(), "500 Internal Server Error");

        let err = mock.fetch_url("https://example.com/c").await.unwrap_err();
        assert_eq!(err.to_string(), "404 Not Found");
    }

    #[tokio::test]
    async fn test_mock_prefix_and_exact() {
        let mock = MockFetcher::new()
            .with_prefix("https://api.example.com/search", "{}")
            .with_page("https://api.example.com/search?page=2", "exact");

        assert_eq!(mock.fetch_url("https://api.example.com/search?page=1").await.unwrap(), "{}");
        assert_eq!(mock.fetch_url("https://api.example.com/search?page=2").await.unwrap(), "exact");
    }

    #[tokio::test]
    async fn test_mock_call_tracking() {
        let mock = MockFetcher::new();
        let shared = mock.clone();

        let request = FetchRequest::get("https://example.com/x").with_header("Authorization", "Bearer t");
        let _ = shared.fetch(&request).await;
        let _ = shared.fetch_url("https://example.com/y").await;

        assert_eq!(
            mock.requested_urls(),
            vec!["https://example.com/x".to_string(), "https://example.com/y".to_string()]
        );
        assert_eq!(mock.calls()[0].headers["Authorization"], "Bearer t");
        assert_eq!(mock.call_count("https://example.com/"), 2);
    }
}

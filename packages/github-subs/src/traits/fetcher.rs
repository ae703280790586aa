//! Page fetcher trait.
//!
//! The discovery pipeline treats HTTP transport as a black box: give it a URL
//! (plus optional body, headers and basic-auth credentials) and get the
//! response text back, or an error for transport failures and non-2xx
//! statuses. Nothing behind this trait retries.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::FetchResult;

/// A single page request.
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// URL to fetch
    pub url: String,

    /// Request body; a present body turns the request into a POST
    pub body: Option<String>,

    /// Extra headers, applied after the fetcher's defaults
    pub headers: IndexMap<String, String>,

    /// Basic-auth user
    pub user: Option<String>,

    /// Basic-auth secret
    pub secret: Option<String>,
}

impl FetchRequest {
    /// Create a plain GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Attach a body (the request becomes a POST).
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set basic-auth credentials.
    pub fn with_basic_auth(mut self, user: impl Into<String>, secret: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.secret = Some(secret.into());
        self
    }

    /// True for POST requests.
    pub fn is_post(&self) -> bool {
        self.body.is_some()
    }

    /// Basic-auth credentials, only when both parts are non-empty.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.secret.as_deref()) {
            (Some(user), Some(secret)) if !user.is_empty() && !secret.is_empty() => {
                Some((user, secret))
            }
            _ => None,
        }
    }
}

/// Fetches page text for the discovery pipeline.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page and return its body as text.
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String>;

    /// Fetch a URL with no body, headers or credentials.
    async fn fetch_url(&self, url: &str) -> FetchResult<String> {
        self.fetch(&FetchRequest::get(url)).await
    }

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_method() {
        assert!(!FetchRequest::get("https://example.com").is_post());
        assert!(FetchRequest::get("https://example.com")
            .with_body("{}")
            .is_post());
    }

    #[test]
    fn test_basic_auth_requires_both_parts() {
        let request = FetchRequest::get("https://example.com").with_basic_auth(",", "");
        assert_eq!(request.basic_auth(), None);

        let request = FetchRequest::get("https://example.com").with_basic_auth("user", "pass");
        assert_eq!(request.basic_auth(), Some(("user", "pass")));
    }

    #[test]
    fn test_headers_keep_last_value() {
        let request = FetchRequest::get("https://example.com")
            .with_header("Accept", "text/plain")
            .with_header("Accept", "application/json");

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers["Accept"], "application/json");
    }
}

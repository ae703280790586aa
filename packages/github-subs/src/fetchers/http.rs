//! HTTP page fetcher backed by reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchRequest, PageFetcher};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_2) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/72.0.3626.119 Safari/537.36";
const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.8";

/// Page fetcher that performs real HTTP requests.
///
/// Every request carries a bounded timeout so a hung endpoint cannot stall a
/// fetch task forever.
///
/// # Example
///
/// ```rust,ignore
/// use github_subs::fetchers::HttpFetcher;
/// use github_subs::traits::fetcher::PageFetcher;
///
/// let fetcher = HttpFetcher::builder().timeout(Duration::from_secs(30)).build()?;
/// let text = fetcher.fetch_url("https://raw.githubusercontent.com/org/repo/main/README.md").await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher with default settings.
    pub fn new() -> FetchResult<Self> {
        HttpFetcherBuilder::new().build()
    }

    /// Start configuring a fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::new()
    }

    fn headers_for(&self, request: &FetchRequest) -> FetchResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent).map_err(|e| FetchError::Http(Box::new(e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));

        for (name, value) in &request.headers {
            let name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::Http(Box::new(e)))?;
            let value = HeaderValue::from_str(value).map_err(|e| FetchError::Http(Box::new(e)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        let url = Url::parse(&request.url).map_err(|_| FetchError::InvalidUrl {
            url: request.url.clone(),
        })?;

        let mut builder = match &request.body {
            Some(body) => self.client.post(url).body(body.clone()),
            None => self.client.get(url),
        };
        builder = builder.headers(self.headers_for(request)?);
        if let Some((user, secret)) = request.basic_auth() {
            builder = builder.basic_auth(user, Some(secret));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request.url.clone(),
                status: status.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Builder for [`HttpFetcher`].
pub struct HttpFetcherBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    idle_timeout: Duration,
    max_idle_per_host: usize,
    insecure_tls: bool,
    user_agent: String,
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcherBuilder {
    /// Create a builder with default transport settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(90),
            max_idle_per_host: 200,
            insecure_tls: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Accept invalid TLS certificates.
    pub fn insecure_tls(mut self, insecure: bool) -> Self {
        self.insecure_tls = insecure;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> FetchResult<HttpFetcher> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.idle_timeout)
            .pool_max_idle_per_host(self.max_idle_per_host)
            .danger_accept_invalid_certs(self.insecure_tls)
            .build()
            .map_err(|e| FetchError::Client(Box::new(e)))?;

        Ok(HttpFetcher {
            client,
            user_agent: self.user_agent,
        })
    }
}

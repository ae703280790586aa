//! Discovery orchestration.
//!
//! One sequential pagination loop feeds fetch tasks onto a `JoinSet`. Each
//! task waits its own delay, takes a concurrency permit, fetches the raw page
//! and scans it. Names stream out on a channel as soon as they are found;
//! the run returns only after every task has finished. If the receiving end
//! of the channel goes away, pagination stops and pending tasks are aborted.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::domains::DomainParser;
use crate::error::{ConfigError, Result};
use crate::fetchers::HttpFetcher;
use crate::filter::StringFilter;
use crate::rate_limit::RateLimit;
use crate::scanner::ContentScanner;
use crate::search::{
    PaginationOutcome, SearchPaginator, DEFAULT_SEARCH_ENDPOINT, MAX_PAGES, RESULTS_PER_PAGE,
};
use crate::security::SecretString;
use crate::traits::fetcher::PageFetcher;

/// Configuration for a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Minimum spacing between search page requests.
    ///
    /// Default: 7 seconds.
    pub page_interval: Duration,

    /// Delay each fetch task waits before requesting its page.
    ///
    /// Independent of `page_interval`. Default: 7 seconds.
    pub fetch_delay: Duration,

    /// Pages of search results to walk (capped at 100).
    pub max_pages: u32,

    /// Results requested per search page (capped at 100).
    pub per_page: u32,

    /// Maximum fetch requests in flight at once.
    ///
    /// Default: 32.
    pub max_concurrent_fetches: usize,

    /// Code search endpoint.
    pub search_endpoint: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_interval: Duration::from_secs(7),
            fetch_delay: Duration::from_secs(7),
            max_pages: MAX_PAGES,
            per_page: RESULTS_PER_PAGE,
            max_concurrent_fetches: 32,
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same delay for page pacing and fetch tasks.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.page_interval = delay;
        self.fetch_delay = delay;
        self
    }

    /// Set the search page interval.
    pub fn with_page_interval(mut self, interval: Duration) -> Self {
        self.page_interval = interval;
        self
    }

    /// Set the per-task fetch delay.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// Set the page bound.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.min(MAX_PAGES);
        self
    }

    /// Set the results per search page.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, RESULTS_PER_PAGE);
        self
    }

    /// Set the fetch concurrency bound (1 to `Semaphore::MAX_PERMITS`).
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    /// Set the search endpoint.
    pub fn with_search_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.search_endpoint = endpoint.into();
        self
    }
}

/// Counters for a finished run.
#[derive(Debug)]
pub struct DiscoveryReport {
    /// Search pages fetched and parsed
    pub pages_searched: u32,

    /// Raw-content URLs handed to fetch tasks
    pub urls_dispatched: usize,

    /// Fetch tasks whose request failed
    pub fetch_failures: usize,

    /// Distinct names emitted
    pub names_emitted: usize,

    /// How pagination ended
    pub outcome: PaginationOutcome,
}

enum TaskOutcome {
    Scanned { names: usize },
    FetchFailed,
}

/// Subdomain discovery over a code search index.
///
/// # Example
///
/// ```rust,ignore
/// use github_subs::{Discovery, DiscoveryConfig, HttpFetcher};
///
/// let discovery = Discovery::new(HttpFetcher::new()?, token, DiscoveryConfig::new());
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// tokio::spawn(async move {
///     while let Some(name) = rx.recv().await {
///         println!("{}", name);
///     }
/// });
/// let report = discovery.run("example.com", tx).await?;
/// ```
pub struct Discovery<F: PageFetcher + 'static> {
    fetcher: Arc<F>,
    token: SecretString,
    config: DiscoveryConfig,
}

impl<F: PageFetcher + 'static> Discovery<F> {
    /// Create a discovery run over any fetcher.
    pub fn new(fetcher: F, token: SecretString, config: DiscoveryConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            token,
            config,
        }
    }

    /// The run configuration.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover subdomains of `domain`, sending each new name on `names`.
    ///
    /// Fails only when `domain` is malformed, before any request is made.
    /// A pagination abort is reported in the returned [`DiscoveryReport`].
    pub async fn run(
        &self,
        domain: &str,
        names: mpsc::UnboundedSender<String>,
    ) -> Result<DiscoveryReport> {
        let domain = domain.trim();
        let parser = DomainParser::new();
        parser.add_domain(domain);
        let pattern = parser
            .domain_regex(domain)
            .ok_or_else(|| ConfigError::InvalidDomain {
                domain: domain.to_string(),
            })?;

        info!(
            domain = %domain,
            fetcher = self.fetcher.name(),
            max_pages = self.config.max_pages,
            page_interval_secs = self.config.page_interval.as_secs_f64(),
            fetch_delay_secs = self.config.fetch_delay.as_secs_f64(),
            "Starting subdomain discovery"
        );

        let output = names.clone();
        let scanner = Arc::new(ContentScanner::new(
            pattern,
            Arc::new(StringFilter::new()),
            names,
        ));
        let permits = Arc::new(Semaphore::new(
            self.config.max_concurrent_fetches.clamp(1, Semaphore::MAX_PERMITS),
        ));
        let paginator = SearchPaginator::new(
            Arc::clone(&self.fetcher),
            self.token.clone(),
            Arc::new(RateLimit::with_interval(self.config.page_interval)),
            Arc::new(StringFilter::new()),
        )
        .with_endpoint(self.config.search_endpoint.clone())
        .with_max_pages(self.config.max_pages)
        .with_per_page(self.config.per_page);

        let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();
        let fetch_delay = self.config.fetch_delay;
        let summary = paginator
            .run(domain, |url| {
                if output.is_closed() {
                    return ControlFlow::Break(());
                }
                tasks.spawn(fetch_and_scan(
                    Arc::clone(&self.fetcher),
                    Arc::clone(&scanner),
                    Arc::clone(&permits),
                    fetch_delay,
                    url,
                ));
                ControlFlow::Continue(())
            })
            .await;

        if output.is_closed() {
            warn!(domain = %domain, pending = tasks.len(), "Output closed, aborting fetch tasks");
            tasks.abort_all();
        }
        drop(output);

        let mut report = DiscoveryReport {
            pages_searched: summary.pages_searched,
            urls_dispatched: summary.urls_dispatched,
            fetch_failures: 0,
            names_emitted: 0,
            outcome: summary.outcome,
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskOutcome::Scanned { names }) => report.names_emitted += names,
                Ok(TaskOutcome::FetchFailed) => report.fetch_failures += 1,
                Err(e) if e.is_cancelled() => {}
                Err(e) => warn!(error = %e, "Fetch task did not complete"),
            }
        }

        info!(
            domain = %domain,
            pages = report.pages_searched,
            urls = report.urls_dispatched,
            fetch_failures = report.fetch_failures,
            names = report.names_emitted,
            aborted = report.outcome.is_aborted(),
            cancelled = matches!(report.outcome, PaginationOutcome::Cancelled),
            "Subdomain discovery finished"
        );

        Ok(report)
    }
}

impl Discovery<HttpFetcher> {
    /// Create a discovery run over HTTP with a per-request `timeout`.
    pub fn with_http(
        token: SecretString,
        config: DiscoveryConfig,
        timeout: Duration,
    ) -> Result<Self> {
        let fetcher = HttpFetcher::builder().timeout(timeout).build()?;
        Ok(Self::new(fetcher, token, config))
    }
}

async fn fetch_and_scan<F: PageFetcher>(
    fetcher: Arc<F>,
    scanner: Arc<ContentScanner>,
    permits: Arc<Semaphore>,
    delay: Duration,
    url: String,
) -> TaskOutcome {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let Ok(_permit) = permits.acquire().await else {
        return TaskOutcome::FetchFailed;
    };

    match fetcher.fetch_url(&url).await {
        Ok(text) => TaskOutcome::Scanned {
            names: scanner.scan(&text),
        },
        Err(_) => TaskOutcome::FetchFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use crate::fetchers::MockFetcher;

    fn quick_config() -> DiscoveryConfig {
        DiscoveryConfig::new()
            .with_delay(Duration::ZERO)
            .with_search_endpoint("https://search.test/code")
            .with_max_pages(2)
    }

    #[tokio::test]
    async fn test_invalid_domain_makes_no_requests() {
        let mock = MockFetcher::new();
        let discovery = Discovery::new(mock.clone(), SecretString::new("t"), quick_config());
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = discovery.run("localhost", tx).await.unwrap_err();

        assert!(matches!(
            err,
            DiscoveryError::Config(ConfigError::InvalidDomain { .. })
        ));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failures_counted() {
        let mock = MockFetcher::new().with_prefix(
            "https://search.test/code",
            r#"{"total_count": 1, "items": [{"html_url": "https://github.com/o/r/blob/main/gone.txt", "score": 1.0}]}"#,
        );
        let discovery = Discovery::new(mock, SecretString::new("t"), quick_config());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let report = discovery.run("example.com", tx).await.unwrap();

        assert_eq!(report.pages_searched, 2);
        assert_eq!(report.urls_dispatched, 1);
        assert_eq!(report.fetch_failures, 1);
        assert_eq!(report.names_emitted, 0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_closed_output_stops_run() {
        let mock = MockFetcher::new().with_prefix(
            "https://search.test/code",
            r#"{"total_count": 1, "items": [{"html_url": "https://github.com/o/r/blob/main/hosts", "score": 1.0}]}"#,
        );
        let discovery = Discovery::new(
            mock.clone(),
            SecretString::new("t"),
            quick_config().with_max_pages(100),
        );
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let report = discovery.run("example.com", tx).await.unwrap();

        assert!(matches!(report.outcome, PaginationOutcome::Cancelled));
        assert_eq!(report.pages_searched, 1);
        assert_eq!(report.urls_dispatched, 0);
        assert_eq!(mock.call_count("https://search.test/code"), 1);
        assert_eq!(mock.call_count("https://raw.githubusercontent.com"), 0);
    }

    #[test]
    fn test_with_http_keeps_config() {
        let discovery = Discovery::with_http(
            SecretString::new("t"),
            quick_config().with_per_page(50),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(discovery.fetcher.name(), "http");
        assert_eq!(discovery.config().per_page, 50);
        assert_eq!(discovery.config().max_pages, 2);
    }

    #[test]
    fn test_config_builder() {
        let config = DiscoveryConfig::new()
            .with_delay(Duration::from_secs(3))
            .with_fetch_delay(Duration::from_secs(1))
            .with_max_pages(1000)
            .with_max_concurrent_fetches(4)
            .with_per_page(0);

        assert_eq!(config.page_interval, Duration::from_secs(3));
        assert_eq!(config.fetch_delay, Duration::from_secs(1));
        assert_eq!(config.max_pages, MAX_PAGES);
        assert_eq!(config.max_concurrent_fetches, 4);
        assert_eq!(config.per_page, 1);

        let config = DiscoveryConfig::new().with_max_concurrent_fetches(usize::MAX);
        assert_eq!(config.max_concurrent_fetches, Semaphore::MAX_PERMITS);
        assert_eq!(DiscoveryConfig::new().per_page, RESULTS_PER_PAGE);
    }
}

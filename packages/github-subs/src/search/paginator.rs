//! Paginated walk over code search results.
//!
//! Each page is fetched after a wait on the shared [`RateLimit`], parsed,
//! and every first-seen raw-content URL on it is handed to a dispatch
//! callback. The walk ends after the last page, on the first request or
//! parse error, or when the callback breaks.

use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{SearchError, SearchResult};
use crate::filter::StringFilter;
use crate::rate_limit::RateLimit;
use crate::search::query::{
    build_search_url, raw_content_url, SearchPage, DEFAULT_SEARCH_ENDPOINT, RESULTS_PER_PAGE,
};
use crate::security::SecretString;
use crate::traits::fetcher::{FetchRequest, PageFetcher};

/// Hard upper bound on pages walked.
pub const MAX_PAGES: u32 = 100;

/// How a pagination run ended.
#[derive(Debug)]
pub enum PaginationOutcome {
    /// Every page up to the bound was searched
    Exhausted,

    /// A page could not be fetched or parsed
    Aborted(SearchError),

    /// The dispatcher asked to stop
    Cancelled,
}

impl PaginationOutcome {
    /// True if pagination stopped on an error.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

/// Counters from one pagination run.
#[derive(Debug)]
pub struct PaginationSummary {
    /// Pages fetched and parsed successfully
    pub pages_searched: u32,

    /// First-seen URLs handed to the dispatcher
    pub urls_dispatched: usize,

    /// Why the run stopped
    pub outcome: PaginationOutcome,
}

/// Walks search result pages for a domain query.
pub struct SearchPaginator<F: PageFetcher> {
    fetcher: Arc<F>,
    token: SecretString,
    limiter: Arc<RateLimit>,
    seen_urls: Arc<StringFilter>,
    endpoint: String,
    max_pages: u32,
    per_page: u32,
}

impl<F: PageFetcher> SearchPaginator<F> {
    /// Create a paginator over the default endpoint.
    pub fn new(
        fetcher: Arc<F>,
        token: SecretString,
        limiter: Arc<RateLimit>,
        seen_urls: Arc<StringFilter>,
    ) -> Self {
        Self {
            fetcher,
            token,
            limiter,
            seen_urls,
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            max_pages: MAX_PAGES,
            per_page: RESULTS_PER_PAGE,
        }
    }

    /// Use a different search endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Request `per_page` results per page (1 to [`RESULTS_PER_PAGE`]).
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, RESULTS_PER_PAGE);
        self
    }

    /// Stop after `max_pages` pages (never more than [`MAX_PAGES`]).
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.min(MAX_PAGES);
        self
    }

    fn request_for(&self, url: String) -> FetchRequest {
        FetchRequest::get(url)
            .with_header("Authorization", self.token.bearer())
            .with_header("Content-Type", "application/json")
    }

    /// Fetch and parse a single result page.
    pub async fn fetch_page(&self, domain: &str, page: u32) -> SearchResult<SearchPage> {
        let url = build_search_url(&self.endpoint, domain, page, self.per_page)?;
        let text = self
            .fetcher
            .fetch(&self.request_for(url))
            .await
            .map_err(|source| SearchError::Request { page, source })?;

        SearchPage::parse(page, &text)
    }

    /// Walk all pages, calling `dispatch` once per first-seen raw URL.
    ///
    /// `dispatch` must not block; it is expected to spawn the fetch work.
    /// Returning `ControlFlow::Break` ends the walk without counting that URL.
    pub async fn run<D>(&self, domain: &str, mut dispatch: D) -> PaginationSummary
    where
        D: FnMut(String) -> ControlFlow<()> + Send,
    {
        let mut pages_searched = 0;
        let mut urls_dispatched = 0;

        for page in 1..=self.max_pages {
            self.limiter.check_rate_limit().await;

            let result = match self.fetch_page(domain, page).await {
                Ok(result) => result,
                Err(e) => {
                    error!(domain = %domain, page = page, error = %e, "Search pagination aborted");
                    return PaginationSummary {
                        pages_searched,
                        urls_dispatched,
                        outcome: PaginationOutcome::Aborted(e),
                    };
                }
            };
            pages_searched += 1;

            debug!(
                page = page,
                total = result.total,
                items = result.items.len(),
                "Fetched search page"
            );

            for item in result.items {
                let raw = raw_content_url(&item.url);
                if raw.is_empty() || self.seen_urls.duplicate(&raw) {
                    continue;
                }
                debug!(url = %raw, "Dispatching fetch");
                if dispatch(raw).is_break() {
                    info!(domain = %domain, page = page, "Search pagination cancelled");
                    return PaginationSummary {
                        pages_searched,
                        urls_dispatched,
                        outcome: PaginationOutcome::Cancelled,
                    };
                }
                urls_dispatched += 1;
            }
        }

        PaginationSummary {
            pages_searched,
            urls_dispatched,
            outcome: PaginationOutcome::Exhausted,
        }
    }
}

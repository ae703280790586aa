//! Code search pagination.

pub mod paginator;
pub mod query;

pub use paginator::{PaginationOutcome, PaginationSummary, SearchPaginator, MAX_PAGES};
pub use query::{
    build_search_url, raw_content_url, SearchItem, SearchPage, DEFAULT_SEARCH_ENDPOINT,
    RESULTS_PER_PAGE,
};

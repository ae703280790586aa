//! Subdomain Discovery Through Code Search
//!
//! Searches a code-hosting platform's index for files that mention a domain,
//! fetches the raw content of each hit and extracts every subdomain-shaped
//! name from it.
//!
//! # Pipeline
//!
//! 1. [`SearchPaginator`] walks up to 100 result pages, spaced by a shared
//!    [`RateLimit`], and rewrites each hit to its raw-content URL.
//! 2. Every first-seen URL becomes a concurrent fetch task (bounded, with its
//!    own delay).
//! 3. [`ContentScanner`] applies the [`DomainPattern`] to the fetched text,
//!    cleans each match with [`clean_name`] and emits first-seen names.
//!
//! # Usage
//!
//! ```rust,ignore
//! use github_subs::{Discovery, DiscoveryConfig, HttpFetcher, SecretString};
//!
//! let discovery = Discovery::new(
//!     HttpFetcher::new()?,
//!     SecretString::new(token),
//!     DiscoveryConfig::new().with_delay(Duration::from_secs(7)),
//! );
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let report = discovery.run("example.com", tx).await?;
//! ```
//!
//! # Modules
//!
//! - [`domains`] - Domain registry and subdomain patterns
//! - [`filter`] - Seen-set string filter
//! - [`rate_limit`] - Minimum-spacing rate limiter
//! - [`traits`] - Page fetcher abstraction
//! - [`fetchers`] - HTTP and mock fetchers
//! - [`search`] - Search request building and pagination
//! - [`scanner`] - Name extraction and cleaning
//! - [`pipeline`] - Orchestration of a full run
//! - [`config`] - Command-line configuration

pub mod config;
pub mod domains;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod pipeline;
pub mod rate_limit;
pub mod scanner;
pub mod search;
pub mod security;
pub mod traits;

// Re-export core types at crate root
pub use domains::{DomainParser, DomainPattern};
pub use error::{ConfigError, DiscoveryError, FetchError, SearchError};
pub use fetchers::{HttpFetcher, MockFetcher};
pub use filter::StringFilter;
pub use pipeline::{Discovery, DiscoveryConfig, DiscoveryReport};
pub use rate_limit::RateLimit;
pub use scanner::{clean_name, ContentScanner};
pub use search::{
    build_search_url, raw_content_url, PaginationOutcome, PaginationSummary, SearchItem,
    SearchPage, SearchPaginator,
};
pub use security::SecretString;
pub use traits::fetcher::{FetchRequest, PageFetcher};

//! Typed errors for the discovery pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`); the binary is the only
//! place errors are flattened into `anyhow::Error`.

use thiserror::Error;

/// Errors that end a discovery run before it starts.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP fetcher could not be built
    #[error("fetcher error: {0}")]
    Fetch(#[from] FetchError),
}

/// Configuration problems, all detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API token was supplied
    #[error("please check your api key")]
    MissingToken,

    /// No target domain was supplied
    #[error("please check your domain")]
    MissingDomain,

    /// The target domain was rejected by the domain parser
    #[error("invalid domain: {domain}")]
    InvalidDomain { domain: String },

    /// A numeric option is outside its supported range
    #[error("--{option} must be at most {max}, got {value}")]
    OutOfRange {
        option: &'static str,
        value: u64,
        max: u64,
    },
}

/// Errors returned by a page fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-2xx status
    #[error("{status}")]
    Status { url: String, status: String },

    /// The URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The HTTP client could not be built
    #[error("client error: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that abort pagination of the search index.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Request for a result page failed
    #[error("search request failed on page {page}: {source}")]
    Request {
        page: u32,
        #[source]
        source: FetchError,
    },

    /// Result page was not the expected JSON document
    #[error("search response on page {page} could not be parsed: {source}")]
    Parse {
        page: u32,
        #[source]
        source: serde_json::Error,
    },

    /// The configured search endpoint is not a valid URL
    #[error("invalid search endpoint: {endpoint}")]
    InvalidEndpoint { endpoint: String },
}

/// Result type alias for discovery runs.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

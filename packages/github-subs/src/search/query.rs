//! Code search request construction and response types.

use serde::Deserialize;
use url::Url;

use crate::error::{SearchError, SearchResult};

/// Default code search endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.github.com/search/code";

/// Results requested per page.
pub const RESULTS_PER_PAGE: u32 = 100;

/// One page of code search results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    /// Total matches reported by the index
    #[serde(rename = "total_count", default)]
    pub total: u64,

    /// Items on this page
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// A single search hit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    /// Browser URL of the matching file
    #[serde(rename = "html_url", default)]
    pub url: String,

    /// Relevance score (unused by the pipeline)
    #[serde(default)]
    pub score: f64,
}

impl SearchPage {
    /// Parse a result page from its JSON text.
    pub fn parse(page: u32, text: &str) -> SearchResult<Self> {
        serde_json::from_str(text).map_err(|source| SearchError::Parse { page, source })
    }
}

/// Build the URL for one page of an exact-phrase search for `domain`, newest
/// indexed first.
pub fn build_search_url(
    endpoint: &str,
    domain: &str,
    page: u32,
    per_page: u32,
) -> SearchResult<String> {
    let mut url = Url::parse(endpoint).map_err(|_| SearchError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
    })?;

    url.query_pairs_mut()
        .clear()
        .append_pair("s", "indexed")
        .append_pair("type", "Code")
        .append_pair("o", "desc")
        .append_pair("q", &format!("\"{}\"", domain))
        .append_pair("page", &page.to_string())
        .append_pair("per_page", &per_page.to_string());

    Ok(url.into())
}

/// Rewrite a blob-view URL into its raw-content equivalent.
///
/// `https://github.com/org/repo/blob/main/file.txt` becomes
/// `https://raw.githubusercontent.com/org/repo/main/file.txt`.
pub fn raw_content_url(url: &str) -> String {
    url.replacen("https://github.com/", "https://raw.githubusercontent.com/", 1)
        .replacen("/blob/", "/", 1)
}

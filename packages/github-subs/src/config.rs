//! Command-line configuration.
//!
//! The token may also come from `GITHUB_TOKEN` (including a `.env` file
//! loaded by the binary before parsing).

use clap::Parser;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::error::ConfigError;
use crate::pipeline::DiscoveryConfig;
use crate::rate_limit::MAX_INTERVAL;
use crate::search::{DEFAULT_SEARCH_ENDPOINT, MAX_PAGES};
use crate::security::SecretString;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "github-subs", about = "Find subdomains of a domain in code search results")]
pub struct Args {
    /// Code search API token
    #[arg(long = "api", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub api: String,

    /// Domain to search
    #[arg(short = 'd', long = "domain")]
    pub domain: String,

    /// Delay each request (seconds)
    #[arg(long, default_value_t = 7)]
    pub delay: u64,

    /// Pages of search results to walk
    #[arg(long = "max-pages", default_value_t = MAX_PAGES)]
    pub max_pages: u32,

    /// Maximum concurrent page fetches
    #[arg(long, default_value_t = 32)]
    pub concurrency: usize,

    /// Per-request timeout (seconds)
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Code search endpoint
    #[arg(long, default_value = DEFAULT_SEARCH_ENDPOINT)]
    pub endpoint: String,
}

/// Validated settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub token: SecretString,
    pub domain: String,
    pub timeout: Duration,
    pub discovery: DiscoveryConfig,
}

impl Args {
    /// Validate the arguments.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let token = SecretString::new(self.api);
        if token.is_blank() {
            return Err(ConfigError::MissingToken);
        }

        let domain = self.domain.trim().to_string();
        if domain.is_empty() {
            return Err(ConfigError::MissingDomain);
        }

        check_range("delay", self.delay, MAX_INTERVAL.as_secs())?;
        check_range(
            "concurrency",
            self.concurrency as u64,
            Semaphore::MAX_PERMITS as u64,
        )?;

        let discovery = DiscoveryConfig::new()
            .with_delay(Duration::from_secs(self.delay))
            .with_max_pages(self.max_pages)
            .with_max_concurrent_fetches(self.concurrency)
            .with_search_endpoint(self.endpoint);

        Ok(Settings {
            token,
            domain,
            timeout: Duration::from_secs(self.timeout),
            discovery,
        })
    }
}

fn check_range(option: &'static str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::OutOfRange { option, value, max });
    }
    Ok(())
}

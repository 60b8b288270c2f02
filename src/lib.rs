//! Website Scraper: domain-scoped site harvesting
//!
//! This crate discovers the pages of a web site through a search provider,
//! crawls them breadth-first within a page budget, and renders the collected
//! pages into a plain-text artifact and a paginated PDF document.
//!
//! Every network or rendering capability is an ordered chain of
//! interchangeable backends: a failing backend is skipped and the next one is
//! tried, so partial failure of one strategy never aborts a session.

pub mod chain;
pub mod config;
pub mod crawler;
pub mod orchestrator;
pub mod output;
pub mod search;
pub mod url;

use thiserror::Error;

/// Failure of a single backend attempt
///
/// These never escape the chain that produced them except as the `last`
/// error carried by a chain-level error.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend {backend} is not available: {reason}")]
    Unavailable { backend: String, reason: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Render error: {0}")]
    Render(String),
}

/// Every fetch backend failed for one URL
#[derive(Debug, Error)]
#[error("Failed to fetch {url}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub last: Option<BackendError>,
}

/// Every search backend failed
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("No search backend is available")]
    NoBackends,

    #[error("All search backends failed")]
    Exhausted {
        #[source]
        last: Option<BackendError>,
    },

    #[error("Search cancelled")]
    Cancelled,
}

/// Every rendering backend failed for one artifact kind
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No document backend is available")]
    NoBackends,

    #[error("Unable to export document with any available backend")]
    Exhausted {
        #[source]
        last: Option<BackendError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and parameter validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, ScrapeParameters};
pub use crawler::{CrawlEngine, FetchChain, FetchResult, PageContent};
pub use orchestrator::{perform_scrape, ScrapeOutcome, Scraper};
pub use output::{render_text, DocumentExporter, RenderedDocument};
pub use search::SearchChain;
pub use url::{normalize, normalize_base_url, DomainScope, NormalizedUrl};

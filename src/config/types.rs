use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser-like user agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

/// Main configuration structure, as read from a TOML file
///
/// Every table is optional; missing values fall back to the defaults of
/// the command-line tool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Crawl budget configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages collected in one session
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum number of search results used as extra seeds
    #[serde(rename = "max-search-results")]
    pub max_search_results: usize,

    /// Maximum number of fetches in flight at once
    pub concurrency: usize,

    /// Overall session timeout in seconds
    #[serde(rename = "session-timeout")]
    pub session_timeout: Option<f64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            max_search_results: 100,
            concurrency: 1,
            session_timeout: None,
        }
    }
}

/// HTTP request configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout: f64,

    /// Delay after each successful fetch in seconds
    pub pause: f64,

    /// User-Agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: 15.0,
            pause: 1.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Artifact output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the artifacts are written into
    pub directory: String,

    /// File name of the text artifact
    #[serde(rename = "text-file")]
    pub text_file: String,

    /// File name of the document artifact
    #[serde(rename = "document-file")]
    pub document_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            text_file: "scraped_content.txt".to_string(),
            document_file: "scraped_content.pdf".to_string(),
        }
    }
}

impl Config {
    /// Builds the session parameters for `url` from this configuration
    pub fn parameters(&self, url: impl Into<String>) -> ScrapeParameters {
        ScrapeParameters {
            url: url.into(),
            max_pages: self.crawler.max_pages,
            max_search_results: self.crawler.max_search_results,
            timeout: self.http.timeout,
            pause: self.http.pause,
            user_agent: self.http.user_agent.clone(),
            concurrency: self.crawler.concurrency,
            session_timeout: self.crawler.session_timeout,
        }
    }
}

/// Immutable configuration for one scraping session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeParameters {
    /// Start URL or bare domain
    pub url: String,

    /// Page budget
    pub max_pages: usize,

    /// Cap on search results considered for seeding
    pub max_search_results: usize,

    /// Per-request timeout in seconds
    pub timeout: f64,

    /// Pause after each successful fetch in seconds
    pub pause: f64,

    /// User-Agent header value
    pub user_agent: String,

    /// Maximum number of fetches in flight
    pub concurrency: usize,

    /// Overall session timeout in seconds
    pub session_timeout: Option<f64>,
}

impl ScrapeParameters {
    /// Creates parameters for `url` with every other value defaulted
    pub fn new(url: impl Into<String>) -> Self {
        Config::default().parameters(url)
    }

    pub fn timeout_duration(&self) -> Duration {
        seconds(self.timeout)
    }

    pub fn pause_duration(&self) -> Duration {
        seconds(self.pause)
    }

    pub fn session_timeout_duration(&self) -> Option<Duration> {
        self.session_timeout.map(seconds)
    }
}

/// Converts validated seconds into a duration; invalid values become zero
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

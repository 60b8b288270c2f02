//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests returning decoded page text
//! - Error classification per backend
//! - The fetch chain trying backends in order until one succeeds

use crate::chain::Registry;
use crate::config::ScrapeParameters;
use crate::{BackendError, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// The requested URL
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Decoded page body
    pub content: String,

    /// Name of the backend that produced this result
    pub strategy: String,
}

/// One HTTP retrieval strategy
#[async_trait]
pub trait FetchBackend: Send + Sync {
    /// Performs a GET for `url`, returning decoded text and status
    async fn attempt(&self, url: &str) -> Result<FetchResult, BackendError>;
}

/// Settings shared by the HTTP backends
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
}

impl HttpSettings {
    pub fn from_params(params: &ScrapeParameters) -> Self {
        Self {
            user_agent: params.user_agent.clone(),
            timeout: params.timeout_duration(),
        }
    }
}

/// Async reqwest-based backend
pub struct ReqwestBackend {
    name: &'static str,
    client: Client,
}

impl ReqwestBackend {
    pub const NAME: &'static str = "reqwest";
    pub const HTTP1_NAME: &'static str = "reqwest-http1";

    /// Full-featured client: compression and protocol negotiation enabled
    pub fn new(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        let client = base_builder(settings).gzip(true).brotli(true).build()?;
        Ok(Self {
            name: Self::NAME,
            client,
        })
    }

    /// Conservative client: HTTP/1.1 only, no transfer compression
    pub fn http1(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        let client = base_builder(settings)
            .http1_only()
            .gzip(false)
            .brotli(false)
            .build()?;
        Ok(Self {
            name: Self::HTTP1_NAME,
            client,
        })
    }
}

/// Client settings shared by both async variants
///
/// Idle connections are not pooled so that no connection outlives the
/// fetch that opened it.
fn base_builder(settings: &HttpSettings) -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(settings.timeout)
        .connect_timeout(settings.timeout)
        .pool_max_idle_per_host(0)
}

#[async_trait]
impl FetchBackend for ReqwestBackend {
    async fn attempt(&self, url: &str) -> Result<FetchResult, BackendError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content = response.text().await.map_err(|e| BackendError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(FetchResult {
            url: url.to_string(),
            status_code: status.as_u16(),
            content,
            strategy: self.name.to_string(),
        })
    }
}

/// Maps a reqwest error onto the backend error taxonomy
fn classify_error(url: &str, e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        BackendError::Connect {
            url: url.to_string(),
        }
    } else {
        BackendError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Blocking reqwest client run on the blocking thread pool
///
/// The client is built and dropped inside the blocking task on every
/// attempt.
#[cfg(feature = "blocking")]
pub struct BlockingBackend {
    settings: HttpSettings,
}

#[cfg(feature = "blocking")]
impl BlockingBackend {
    pub const NAME: &'static str = "reqwest-blocking";

    pub fn new(settings: &HttpSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }
}

#[cfg(feature = "blocking")]
#[async_trait]
impl FetchBackend for BlockingBackend {
    async fn attempt(&self, url: &str) -> Result<FetchResult, BackendError> {
        let settings = self.settings.clone();
        let url = url.to_string();

        tokio::task::spawn_blocking(move || -> Result<FetchResult, BackendError> {
            let client = reqwest::blocking::Client::builder()
                .user_agent(settings.user_agent)
                .timeout(settings.timeout)
                .pool_max_idle_per_host(0)
                .build()
                .map_err(|e| classify_error(&url, e))?;

            let response = client.get(&url).send().map_err(|e| classify_error(&url, e))?;
            let status = response.status();
            if !status.is_success() {
                return Err(BackendError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            let content = response.text().map_err(|e| BackendError::Body {
                url: url.clone(),
                message: e.to_string(),
            })?;

            Ok(FetchResult {
                url,
                status_code: status.as_u16(),
                content,
                strategy: Self::NAME.to_string(),
            })
        })
        .await?
    }
}

/// Ordered list of fetch backends, first success wins
pub struct FetchChain {
    backends: Registry<dyn FetchBackend>,
    pause: Duration,
}

impl FetchChain {
    /// Creates a chain over an explicit backend registry
    ///
    /// # Arguments
    ///
    /// * `backends` - Backends in the order they are tried
    /// * `pause` - Delay applied after every successful fetch
    pub fn new(backends: Registry<dyn FetchBackend>, pause: Duration) -> Self {
        Self { backends, pause }
    }

    /// Builds the default backend registry for the given HTTP settings
    ///
    /// Order: `reqwest`, `reqwest-http1`, `reqwest-blocking`. A backend
    /// whose client cannot be built, or that is compiled out, is registered
    /// as unavailable.
    pub fn default_backends(settings: &HttpSettings) -> Registry<dyn FetchBackend> {
        let registry = Registry::new()
            .register_result(
                ReqwestBackend::NAME,
                ReqwestBackend::new(settings).map(|b| Box::new(b) as Box<dyn FetchBackend>),
            )
            .register_result(
                ReqwestBackend::HTTP1_NAME,
                ReqwestBackend::http1(settings).map(|b| Box::new(b) as Box<dyn FetchBackend>),
            );

        #[cfg(feature = "blocking")]
        let registry = registry.register(
            BlockingBackend::NAME,
            Box::new(BlockingBackend::new(settings)) as Box<dyn FetchBackend>,
        );

        #[cfg(not(feature = "blocking"))]
        let registry =
            registry.register_unavailable("reqwest-blocking", "built without the `blocking` feature");

        registry
    }

    /// Builds the default chain for a scraping session
    pub fn from_params(params: &ScrapeParameters) -> Self {
        let settings = HttpSettings::from_params(params);
        Self::new(Self::default_backends(&settings), params.pause_duration())
    }

    /// Returns a chain with the same kind of backends and a different pause
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn backends(&self) -> &Registry<dyn FetchBackend> {
        &self.backends
    }

    /// Fetches a URL, trying each available backend in order
    ///
    /// The first backend that returns a result wins and later backends are
    /// not attempted. After a success the configured pause is applied
    /// before returning.
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult)` - A backend succeeded
    /// * `Err(FetchError)` - Every backend failed; carries the last error
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let mut last_error = None;

        for (name, backend) in self.backends.available() {
            match backend.attempt(url).await {
                Ok(result) => {
                    tracing::debug!("Fetched {} via {} ({})", url, name, result.status_code);
                    if !self.pause.is_zero() {
                        tokio::time::sleep(self.pause).await;
                    }
                    return Ok(result);
                }
                Err(e) => {
                    tracing::debug!("Backend {} failed for {}: {}", name, url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(FetchError {
            url: url.to_string(),
            last: last_error,
        })
    }
}

impl std::fmt::Debug for FetchChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchChain")
            .field("backends", &self.backends)
            .field("pause", &self.pause)
            .finish()
    }
}

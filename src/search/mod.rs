//! Seed discovery through search providers
//!
//! This module handles:
//! - The search backend trait implemented by every provider strategy
//! - The search chain that queries backends in order for a domain-scoped
//!   query and accumulates their results
//! - Unwrapping of redirector links before de-duplication

mod duckduckgo;

pub use duckduckgo::DuckDuckGoBackend;

use crate::chain::Registry;
use crate::config::ScrapeParameters;
use crate::crawler::HttpSettings;
use crate::url::unwrap_redirect;
use crate::{BackendError, SearchError};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// One search-provider strategy
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Runs `query`, returning at most `max_results` raw candidate URLs
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, BackendError>;
}

/// Builds the domain-restricted query sent to every backend
pub fn site_query(domain: &str) -> String {
    format!("site:{}", domain)
}

/// Ordered list of search backends whose results are accumulated
pub struct SearchChain {
    backends: Registry<dyn SearchBackend>,
}

impl SearchChain {
    pub fn new(backends: Registry<dyn SearchBackend>) -> Self {
        Self { backends }
    }

    /// Default registry: the DuckDuckGo HTML endpoint, then the lite endpoint
    pub fn default_backends(settings: &HttpSettings) -> Registry<dyn SearchBackend> {
        Self::backends_with_endpoints(
            settings,
            DuckDuckGoBackend::html_endpoint(),
            DuckDuckGoBackend::lite_endpoint(),
        )
    }

    /// Same backends as [`default_backends`](Self::default_backends) against
    /// other endpoint URLs
    pub fn backends_with_endpoints(
        settings: &HttpSettings,
        html: Option<Url>,
        lite: Option<Url>,
    ) -> Registry<dyn SearchBackend> {
        let registry = match html {
            Some(endpoint) => Registry::new().register(
                DuckDuckGoBackend::HTML_NAME,
                Box::new(DuckDuckGoBackend::html(endpoint, settings)) as Box<dyn SearchBackend>,
            ),
            None => Registry::new()
                .register_unavailable(DuckDuckGoBackend::HTML_NAME, "no endpoint configured"),
        };

        match lite {
            Some(endpoint) => registry.register(
                DuckDuckGoBackend::LITE_NAME,
                Box::new(DuckDuckGoBackend::lite(endpoint, settings)) as Box<dyn SearchBackend>,
            ),
            None => registry.register_unavailable(DuckDuckGoBackend::LITE_NAME, "no endpoint configured"),
        }
    }

    /// Builds the default chain for a scraping session
    pub fn from_params(params: &ScrapeParameters) -> Self {
        Self::new(Self::default_backends(&HttpSettings::from_params(params)))
    }

    pub fn backends(&self) -> &Registry<dyn SearchBackend> {
        &self.backends
    }

    /// Searches for pages of `domain`
    ///
    /// See [`search_until`](Self::search_until).
    pub async fn search(&self, domain: &str, max_results: usize) -> Result<Vec<String>, SearchError> {
        self.search_until(domain, max_results, &CancellationToken::new())
            .await
    }

    /// Searches for pages of `domain`, giving up when `cancel` fires
    ///
    /// Backends run in order. Every candidate is passed through the redirect
    /// unwrapper, then appended unless already present. The chain moves to
    /// the next backend only when the current one is exhausted or fails, and
    /// stops as soon as `max_results` URLs have been collected.
    ///
    /// # Returns
    ///
    /// * `Ok(urls)` - At least one backend answered (possibly with nothing)
    /// * `Err(SearchError::Exhausted)` - Every backend failed
    /// * `Err(SearchError::NoBackends)` - No backend is available
    /// * `Err(SearchError::Cancelled)` - Cancelled before any result arrived
    pub async fn search_until(
        &self,
        domain: &str,
        max_results: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, SearchError> {
        let query = site_query(domain);
        let mut found: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut attempted = 0;
        let mut succeeded = 0;
        let mut last_error = None;

        for (name, backend) in self.backends.available() {
            if found.len() >= max_results {
                break;
            }
            attempted += 1;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                outcome = backend.search(&query, max_results) => Some(outcome),
            };

            let Some(outcome) = outcome else {
                tracing::warn!("Search for {} cancelled", domain);
                if found.is_empty() {
                    return Err(SearchError::Cancelled);
                }
                return Ok(found);
            };

            match outcome {
                Ok(candidates) => {
                    succeeded += 1;
                    tracing::debug!("Search backend {} returned {} candidates", name, candidates.len());
                    for candidate in candidates {
                        let Some(cleaned) = unwrap_redirect(&candidate) else {
                            continue;
                        };
                        if seen.insert(cleaned.clone()) {
                            found.push(cleaned);
                            if found.len() >= max_results {
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!("Search backend {} failed: {}", name, e);
                    last_error = Some(e);
                }
            }
        }

        if attempted == 0 {
            return Err(SearchError::NoBackends);
        }
        if succeeded == 0 && found.is_empty() {
            return Err(SearchError::Exhausted { last: last_error });
        }

        tracing::info!("Search for {} found {} URLs", domain, found.len());
        Ok(found)
    }
}

impl std::fmt::Debug for SearchChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchChain")
            .field("backends", &self.backends)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Backend answering with a fixed list, or failing, counting calls
    struct Canned {
        results: Option<Vec<&'static str>>,
        calls: Arc<AtomicUsize>,
        queries: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl Canned {
        fn boxed(results: Option<Vec<&'static str>>) -> (Box<dyn SearchBackend>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let backend = Self {
                results,
                calls: calls.clone(),
                queries: Arc::default(),
            };
            (Box::new(backend), calls)
        }
    }

    #[async_trait]
    impl SearchBackend for Canned {
        async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            match &self.results {
                Some(results) => Ok(results
                    .iter()
                    .take(max_results)
                    .map(|s| s.to_string())
                    .collect()),
                None => Err(BackendError::Parse("provider unavailable".to_string())),
            }
        }
    }

    /// Backend that never answers
    struct Hanging;

    #[async_trait]
    impl SearchBackend for Hanging {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<String>, BackendError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_site_query() {
        assert_eq!(site_query("example.com"), "site:example.com");
    }

    #[tokio::test]
    async fn test_query_is_domain_scoped() {
        let queries = Arc::new(std::sync::Mutex::new(Vec::new()));
        let backend = Canned {
            results: Some(vec![]),
            calls: Arc::default(),
            queries: queries.clone(),
        };
        let chain = SearchChain::new(Registry::new().register("a", Box::new(backend) as Box<dyn SearchBackend>));

        chain.search("example.com", 5).await.unwrap();
        assert_eq!(*queries.lock().unwrap(), vec!["site:example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_results_accumulate_across_backends() {
        let (a, _) = Canned::boxed(Some(vec!["https://example.com/1", "https://example.com/2"]));
        let (b, b_calls) = Canned::boxed(Some(vec![
            "https://example.com/2",
            "https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2F3",
        ]));
        let chain = SearchChain::new(Registry::new().register("a", a).register("b", b));

        let urls = chain.search("example.com", 10).await.unwrap();

        assert_eq!(
            urls,
            vec!["https://example.com/1", "https://example.com/2", "https://example.com/3"]
        );
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stops_at_cap() {
        let (a, _) = Canned::boxed(Some(vec!["https://example.com/1", "https://example.com/2"]));
        let (b, b_calls) = Canned::boxed(Some(vec!["https://example.com/3"]));
        let chain = SearchChain::new(Registry::new().register("a", a).register("b", b));

        let urls = chain.search("example.com", 2).await.unwrap();

        assert_eq!(urls.len(), 2);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_redirect_duplicates_collapse() {
        let (a, _) = Canned::boxed(Some(vec![
            "https://example.com/x",
            "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fx&rut=1",
        ]));
        let chain = SearchChain::new(Registry::new().register("a", a));

        let urls = chain.search("example.com", 10).await.unwrap();
        assert_eq!(urls, vec!["https://example.com/x"]);
    }

    #[tokio::test]
    async fn test_failing_backend_is_skipped() {
        let (a, _) = Canned::boxed(None);
        let (b, _) = Canned::boxed(Some(vec!["https://example.com/ok"]));
        let chain = SearchChain::new(Registry::new().register("a", a).register("b", b));

        let urls = chain.search("example.com", 10).await.unwrap();
        assert_eq!(urls, vec!["https://example.com/ok"]);
    }

    #[tokio::test]
    async fn test_all_backends_failing_is_exhausted() {
        let (a, _) = Canned::boxed(None);
        let (b, _) = Canned::boxed(None);
        let chain = SearchChain::new(Registry::new().register("a", a).register("b", b));

        let err = chain.search("example.com", 10).await.unwrap_err();
        assert!(matches!(err, SearchError::Exhausted { last: Some(_) }));
    }

    #[tokio::test]
    async fn test_no_available_backend() {
        let chain = SearchChain::new(Registry::new().register_unavailable("a", "disabled"));
        let err = chain.search("example.com", 10).await.unwrap_err();
        assert!(matches!(err, SearchError::NoBackends));
    }

    #[tokio::test]
    async fn test_empty_answer_is_not_an_error() {
        let (a, _) = Canned::boxed(Some(vec![]));
        let chain = SearchChain::new(Registry::new().register("a", a));
        assert!(chain.search("example.com", 10).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_search() {
        let token = CancellationToken::new();
        let chain = SearchChain::new(
            Registry::new().register("hang", Box::new(Hanging) as Box<dyn SearchBackend>),
        );

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = chain
            .search_until("example.com", 10, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Cancelled));
    }

    #[test]
    fn test_default_backend_order() {
        let settings = HttpSettings {
            user_agent: "Test/1.0".to_string(),
            timeout: Duration::from_secs(5),
        };
        let registry = SearchChain::default_backends(&settings);
        let names: Vec<&str> = registry.capabilities().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["duckduckgo-html", "duckduckgo-lite"]);
    }
}

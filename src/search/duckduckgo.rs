use crate::crawler::{FetchChain, HttpSettings};
use crate::search::SearchBackend;
use crate::BackendError;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

const HTML_ENDPOINT: &str = "https://duckduckgo.com/html/";
const LITE_ENDPOINT: &str = "https://lite.duckduckgo.com/lite/";

/// DuckDuckGo result page scraper
///
/// The HTML endpoint marks result anchors with `a.result__a`; the lite
/// endpoint has no stable class, so every anchor is taken. Result pages are
/// downloaded through a dedicated fetch chain that never pauses.
pub struct DuckDuckGoBackend {
    endpoint: Url,
    selector: &'static str,
    fetcher: FetchChain,
}

impl DuckDuckGoBackend {
    pub const HTML_NAME: &'static str = "duckduckgo-html";
    pub const LITE_NAME: &'static str = "duckduckgo-lite";

    pub fn html_endpoint() -> Option<Url> {
        Url::parse(HTML_ENDPOINT).ok()
    }

    pub fn lite_endpoint() -> Option<Url> {
        Url::parse(LITE_ENDPOINT).ok()
    }

    pub fn html(endpoint: Url, settings: &HttpSettings) -> Self {
        Self::with_selector(endpoint, "a.result__a", settings)
    }

    pub fn lite(endpoint: Url, settings: &HttpSettings) -> Self {
        Self::with_selector(endpoint, "a", settings)
    }

    fn with_selector(endpoint: Url, selector: &'static str, settings: &HttpSettings) -> Self {
        let fetcher = FetchChain::new(FetchChain::default_backends(settings), Duration::ZERO);
        Self {
            endpoint,
            selector,
            fetcher,
        }
    }

    /// Endpoint URL carrying the query in its `q` parameter
    fn query_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query);
        url
    }

    /// Collects result hrefs, resolved against the result page URL
    fn parse_results(
        &self,
        html: &str,
        page_url: &Url,
        max_results: usize,
    ) -> Result<Vec<String>, BackendError> {
        let selector = Selector::parse(self.selector)
            .map_err(|e| BackendError::Parse(format!("invalid selector {}: {:?}", self.selector, e)))?;
        let document = Html::parse_document(html);

        let results = document
            .select(&selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .take(max_results)
            .filter_map(|href| page_url.join(href).ok())
            .map(|url| url.to_string())
            .collect();

        Ok(results)
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, BackendError> {
        let url = self.query_url(query);
        let page = self.fetcher.fetch(url.as_str()).await.map_err(|e| match e.last {
            Some(last) => last,
            None => BackendError::Unavailable {
                backend: "fetch".to_string(),
                reason: format!("no fetch backend available for {}", e.url),
            },
        })?;

        self.parse_results(&page.content, &url, max_results)
    }
}

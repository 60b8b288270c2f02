//! Scraping session orchestration
//!
//! A session validates its parameters, upgrades the start URL, discovers
//! extra seeds through the search chain, crawls the site, and renders the
//! collected pages into the text and document artifacts.
//!
//! Only parameter validation can fail a session. A failed search degrades
//! to crawling from the start URL alone; a failed document export is
//! reported inside the outcome while the text artifact is still produced.

use crate::config::{validate_parameters, ScrapeParameters};
use crate::crawler::{CrawlEngine, CrawlStats, FetchChain, PageContent};
use crate::output::{render_text, DocumentExporter, RenderedDocument};
use crate::search::SearchChain;
use crate::url::{authority, normalize_base_url};
use crate::{ConfigError, ExportError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything produced by one scraping session
#[derive(Debug)]
pub struct ScrapeOutcome {
    /// The upgraded start URL
    pub base_url: String,

    /// Authority (host plus explicit port) of the start URL
    pub domain: String,

    /// Seeds the crawl started from, start URL first
    pub seeds: Vec<String>,

    /// Collected pages in crawl order
    pub pages: Vec<PageContent>,

    /// The text artifact
    pub rendered_text: String,

    /// The document artifact; empty with an empty strategy when no page was
    /// collected
    pub document: Result<RenderedDocument, ExportError>,

    pub stats: CrawlStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Serializable snapshot of a collected page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub fetch_strategy: String,
}

/// Serializable summary of a session
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub base_url: String,
    pub domain: String,
    pub page_count: usize,
    pub document_strategy: Option<String>,
    pub document_error: Option<String>,
    pub pages: Vec<PageSummary>,
    pub stats: CrawlStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Paths written by [`ScrapeOutcome::write_artifacts`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub text: PathBuf,
    /// `None` when there was no document to write
    pub document: Option<PathBuf>,
}

impl ScrapeOutcome {
    /// Name of the backend that rendered the document, empty when none did
    pub fn document_strategy(&self) -> &str {
        match &self.document {
            Ok(document) => &document.strategy,
            Err(_) => "",
        }
    }

    pub fn text_as_base64(&self) -> String {
        STANDARD.encode(self.rendered_text.as_bytes())
    }

    /// Base64 of the document, or an empty string when there is none
    pub fn document_as_base64(&self) -> String {
        match &self.document {
            Ok(document) if !document.is_empty() => STANDARD.encode(&document.bytes),
            _ => String::new(),
        }
    }

    pub fn page_summaries(&self) -> Vec<PageSummary> {
        self.pages
            .iter()
            .map(|page| PageSummary {
                url: page.url.clone(),
                title: page.title.clone(),
                fetch_strategy: page.fetch_strategy.clone(),
            })
            .collect()
    }

    pub fn to_report(&self) -> ScrapeReport {
        let (document_strategy, document_error) = match &self.document {
            Ok(document) if !document.is_empty() => (Some(document.strategy.clone()), None),
            Ok(_) => (None, None),
            Err(e) => (None, Some(e.to_string())),
        };

        ScrapeReport {
            base_url: self.base_url.clone(),
            domain: self.domain.clone(),
            page_count: self.pages.len(),
            document_strategy,
            document_error,
            pages: self.page_summaries(),
            stats: self.stats.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// Writes the text artifact and, when available, the document artifact
    ///
    /// The directory is created if needed.
    pub fn write_artifacts(
        &self,
        directory: &Path,
        text_name: &str,
        document_name: &str,
    ) -> Result<ArtifactPaths, ExportError> {
        fs::create_dir_all(directory)?;

        let text = directory.join(text_name);
        fs::write(&text, &self.rendered_text)?;
        tracing::info!("Saved text export to {}", text.display());

        let document = match &self.document {
            Ok(document) if !document.is_empty() => {
                let path = directory.join(document_name);
                fs::write(&path, &document.bytes)?;
                tracing::info!(
                    "Saved document export to {} using {}",
                    path.display(),
                    document.strategy
                );
                Some(path)
            }
            _ => None,
        };

        Ok(ArtifactPaths { text, document })
    }
}

/// Builds the seed list: the start URL, then every search result on exactly
/// the same authority, without repeats, in search order
pub fn assemble_seeds(base_url: &Url, domain: &str, results: &[String]) -> Vec<String> {
    let mut seeds = vec![base_url.to_string()];

    for result in results {
        let same_authority = Url::parse(result)
            .ok()
            .and_then(|url| authority(&url))
            .map_or(false, |a| a == domain);

        if same_authority && !seeds.contains(result) {
            seeds.push(result.clone());
        }
    }

    seeds
}

/// Configurable scraping session
///
/// Every chain defaults to the one derived from the parameters; tests and
/// embedders can inject their own.
pub struct Scraper {
    params: ScrapeParameters,
    fetcher: Option<FetchChain>,
    search: Option<SearchChain>,
    exporter: Option<DocumentExporter>,
    allowed_domains: Vec<String>,
    cancel: CancellationToken,
}

impl Scraper {
    pub fn new(params: ScrapeParameters) -> Self {
        Self {
            params,
            fetcher: None,
            search: None,
            exporter: None,
            allowed_domains: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_fetch_chain(mut self, fetcher: FetchChain) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_search_chain(mut self, search: SearchChain) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_document_exporter(mut self, exporter: DocumentExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Restricts the crawl to explicit authorities instead of the derived scope
    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Stops searching and crawling when `token` is cancelled
    ///
    /// The session timeout, when configured, cancels the same token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Runs the session
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeOutcome)` - The session ran; it may hold zero pages
    /// * `Err(ConfigError)` - The parameters were rejected before any
    ///   network activity
    pub async fn run(self) -> Result<ScrapeOutcome, ConfigError> {
        let Scraper {
            params,
            fetcher,
            search,
            exporter,
            allowed_domains,
            cancel,
        } = self;

        validate_parameters(&params)?;
        let base_url =
            normalize_base_url(&params.url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
        let domain = authority(&base_url)
            .ok_or_else(|| ConfigError::InvalidUrl(format!("No host in {}", base_url)))?;

        let started_at = Utc::now();
        let timer = params.session_timeout_duration().map(|limit| {
            let token = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                tracing::warn!("Session timeout of {:?} reached, stopping", limit);
                token.cancel();
            })
        });

        let fetcher = fetcher.unwrap_or_else(|| FetchChain::from_params(&params));
        let search = search.unwrap_or_else(|| SearchChain::from_params(&params));

        tracing::info!("Searching for pages under {}", domain);
        let results = match search
            .search_until(&domain, params.max_search_results, &cancel)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Search failed, crawling from {} only: {}", base_url, e);
                Vec::new()
            }
        };

        let seeds = assemble_seeds(&base_url, &domain, &results);
        tracing::info!(
            "Crawling {} from {} seeds ({} search results)",
            domain,
            seeds.len(),
            results.len()
        );

        let mut engine = CrawlEngine::new(base_url.clone(), fetcher, params.max_pages)
            .with_concurrency(params.concurrency)
            .with_cancellation(cancel.clone());
        if !allowed_domains.is_empty() {
            engine = engine.with_allowed_domains(&allowed_domains);
        }
        let report = engine.scrape(&seeds).await;

        if let Some(timer) = timer {
            timer.abort();
        }

        let rendered_text = render_text(&report.pages);
        let document = if report.pages.is_empty() {
            Ok(RenderedDocument::default())
        } else {
            let exporter = exporter.unwrap_or_else(|| {
                DocumentExporter::default().with_title(format!("Scraped content of {}", domain))
            });
            exporter.export(&report.pages)
        };

        if let Err(e) = &document {
            tracing::warn!("Document export failed: {}", e);
        }

        tracing::info!(
            "Scraped {} pages from {} ({} failed)",
            report.pages.len(),
            domain,
            report.stats.failed
        );

        Ok(ScrapeOutcome {
            base_url: base_url.to_string(),
            domain,
            seeds,
            pages: report.pages,
            rendered_text,
            document,
            stats: report.stats,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Runs a scraping session with the default chains
pub async fn perform_scrape(params: ScrapeParameters) -> Result<ScrapeOutcome, ConfigError> {
    Scraper::new(params).run().await
}

//! Crawl engine - breadth-first traversal of one site
//!
//! This module contains the crawl loop that coordinates:
//! - Seeding and draining the frontier queue
//! - Enforcing the domain scope and the page budget
//! - Dispatching fetches through the fetch chain, bounded by a concurrency window
//! - Extracting text and links from every fetched page
//! - Stopping promptly on cancellation with the pages collected so far

use crate::crawler::fetcher::{FetchChain, FetchResult};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract;
use crate::url::{normalize, DomainScope, NormalizedUrl};
use futures::stream::{FuturesOrdered, StreamExt};
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// One successfully crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    /// Flattened visible text
    pub text: String,
    #[serde(skip)]
    pub raw_html: String,
    /// Name of the fetch backend that retrieved the page
    pub fetch_strategy: String,
}

/// Counters describing one traversal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// URLs fetched successfully (equals the number of pages)
    pub fetched: usize,

    /// URLs attempted whose fetch chain was exhausted
    pub failed: usize,

    /// Dequeued URLs skipped because they were outside the domain scope
    pub out_of_scope: usize,

    /// Whether the traversal was stopped by cancellation
    pub cancelled: bool,
}

/// Result of a traversal
#[derive(Debug)]
pub struct CrawlReport {
    /// Pages in the order they were appended
    pub pages: Vec<PageContent>,

    /// URLs still queued when the traversal stopped
    pub remaining_frontier: Vec<NormalizedUrl>,

    pub stats: CrawlStats,
}

/// Breadth-first crawler over a single site
///
/// An engine performs exactly one traversal: [`scrape`](Self::scrape)
/// consumes it.
pub struct CrawlEngine {
    base_url: Url,
    fetcher: FetchChain,
    max_pages: usize,
    scope: DomainScope,
    concurrency: usize,
    cancel: CancellationToken,
}

impl CrawlEngine {
    /// Creates an engine whose domain scope is derived from `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Context for normalizing seeds and deriving the scope
    /// * `fetcher` - The fetch chain used for every page
    /// * `max_pages` - Page budget
    pub fn new(base_url: Url, fetcher: FetchChain, max_pages: usize) -> Self {
        let scope = DomainScope::derive(&base_url);
        Self {
            base_url,
            fetcher,
            max_pages,
            scope,
            concurrency: 1,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the derived scope with an explicit list of authorities
    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scope = DomainScope::from_domains(domains, &self.base_url);
        self
    }

    /// Sets how many fetches may be in flight at once (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Stops the traversal when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn scope(&self) -> &DomainScope {
        &self.scope
    }

    /// Runs the traversal from the given seeds
    ///
    /// Seeds are normalized against the base URL and all queued before the
    /// first fetch. URLs are then dequeued in FIFO order; out-of-scope URLs
    /// are skipped without touching the visited set or the budget; every
    /// other URL is marked visited before it is fetched. A failed fetch is
    /// logged and dropped. Links of fetched pages are normalized against the
    /// page's own URL and appended to the tail of the queue.
    ///
    /// Work is only dispatched while `pages + in_flight < max_pages`.
    pub async fn scrape<S: AsRef<str>>(self, seeds: &[S]) -> CrawlReport {
        let start_time = Instant::now();
        let mut frontier = Frontier::new();

        for seed in seeds {
            match normalize(seed.as_ref(), &self.base_url) {
                Some(url) => {
                    frontier.push(url);
                }
                None => tracing::debug!("Skipping invalid seed URL: {}", seed.as_ref()),
            }
        }

        tracing::info!(
            "Starting crawl of {} with {} seed URLs (max {} pages)",
            self.base_url,
            frontier.len(),
            self.max_pages
        );

        let mut pages: Vec<PageContent> = Vec::new();
        let mut stats = CrawlStats::default();
        let mut in_flight = FuturesOrdered::new();
        let fetcher = &self.fetcher;

        loop {
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            while in_flight.len() < self.concurrency
                && pages.len() + in_flight.len() < self.max_pages
            {
                let Some(url) = frontier.pop() else {
                    break;
                };

                if frontier.is_visited(&url) {
                    continue;
                }

                if !self.scope.allows(url.as_url()) {
                    tracing::debug!("Skipping {} because it is outside the allowed domains", url);
                    stats.out_of_scope += 1;
                    continue;
                }

                frontier.mark_visited(url.clone());
                in_flight.push_back(async move {
                    let result = fetcher.fetch(url.as_str()).await;
                    (url, result)
                });
            }

            if in_flight.is_empty() {
                break;
            }

            let completed = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                completed = in_flight.next() => completed,
            };

            let Some((url, result)) = completed else {
                stats.cancelled = true;
                break;
            };

            match result {
                Ok(fetched) => {
                    stats.fetched += 1;
                    let page = self.process_page(&url, fetched, &mut frontier);
                    tracing::debug!("Collected {} ({})", page.url, page.title);
                    pages.push(page);

                    if pages.len() % 10 == 0 {
                        tracing::info!(
                            "Progress: {} pages collected, {} in frontier",
                            pages.len(),
                            frontier.len()
                        );
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    match &e.last {
                        Some(last) => tracing::warn!("Failed to fetch {}: {}", url, last),
                        None => tracing::warn!("Failed to fetch {}: no fetch backend available", url),
                    }
                }
            }
        }

        if stats.cancelled {
            tracing::warn!(
                "Crawl cancelled; returning {} pages collected so far",
                pages.len()
            );
        }

        tracing::info!(
            "Crawl completed: {} pages collected, {} failed, {} visited in {:?}",
            pages.len(),
            stats.failed,
            frontier.visited_count(),
            start_time.elapsed()
        );

        CrawlReport {
            pages,
            remaining_frontier: frontier.into_remaining(),
            stats,
        }
    }

    /// Extracts a fetched page and queues its links
    fn process_page(
        &self,
        url: &NormalizedUrl,
        fetched: FetchResult,
        frontier: &mut Frontier,
    ) -> PageContent {
        let extracted = extract(&fetched.content, url.as_url(), &self.scope);

        for link in &extracted.links {
            if let Some(normalized) = normalize(link, url.as_url()) {
                frontier.push(normalized);
            }
        }

        PageContent {
            url: fetched.url,
            title: extracted.title,
            text: extracted.text,
            raw_html: fetched.content,
            fetch_strategy: fetched.strategy,
        }
    }
}

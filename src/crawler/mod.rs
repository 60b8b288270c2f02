//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through an ordered chain of backends
//! - HTML parsing into title, visible text, and in-scope links
//! - The FIFO frontier and visited set
//! - The breadth-first crawl engine

mod engine;
mod fetcher;
mod frontier;
mod parser;

#[cfg(feature = "blocking")]
pub use fetcher::BlockingBackend;
pub use engine::{CrawlEngine, CrawlReport, CrawlStats, PageContent};
pub use fetcher::{FetchBackend, FetchChain, FetchResult, HttpSettings, ReqwestBackend};
pub use frontier::Frontier;
pub use parser::{extract, ExtractedPage};

//! Configuration module for the website scraper
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and turning it into validated [`ScrapeParameters`]
//! for one scraping session.
//!
//! # Example
//!
//! ```no_run
//! use website_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Crawler will fetch at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, HttpConfig, OutputConfig, ScrapeParameters, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

pub use validation::validate_parameters;

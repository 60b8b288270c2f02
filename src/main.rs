//! Website scraper main entry point
//!
//! This is the command-line interface for the website scraper.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use website_scraper::config::{load_config_with_hash, Config};
use website_scraper::Scraper;

/// Website scraper: domain-scoped site harvesting
///
/// Discovers the pages of a site through DuckDuckGo, crawls them
/// breadth-first, and saves the collected text as a plain-text file and a
/// PDF document.
#[derive(Parser, Debug)]
#[command(name = "website-scraper")]
#[command(version = "1.0.0")]
#[command(about = "Scrape an entire site using search results as seeds", long_about = None)]
struct Cli {
    /// Start URL or domain to scrape
    #[arg(value_name = "URL")]
    url: String,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to store the exports
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum number of pages to scrape
    #[arg(long)]
    max_pages: Option<usize>,

    /// Number of search results to consider as seeds
    #[arg(long)]
    max_search_results: Option<usize>,

    /// Timeout for HTTP requests in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Delay after each successful request in seconds
    #[arg(long)]
    pause: Option<f64>,

    /// Custom User-Agent header
    #[arg(long)]
    user_agent: Option<String>,

    /// Maximum number of requests in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Stop the whole session after this many seconds
    #[arg(long)]
    session_timeout: Option<f64>,

    /// Print a JSON report of the session to stdout
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let params = apply_overrides(&cli, &config);
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the pages collected so far");
            interrupt.cancel();
        }
    });

    let outcome = match Scraper::new(params).with_cancellation(cancel).run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Invalid parameters: {}", e);
            return Err(e.into());
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome.to_report())?);
    }

    if outcome.pages.is_empty() {
        tracing::warn!("No pages were scraped. Please check the URL or increase the limits.");
        return Ok(());
    }

    if let Err(e) = &outcome.document {
        tracing::error!("Document export failed: {}", e);
    }

    outcome
        .write_artifacts(
            &output_dir,
            &config.output.text_file,
            &config.output.document_file,
        )
        .with_context(|| format!("Failed to write exports to {}", output_dir.display()))?;

    tracing::info!("Scraped {} pages.", outcome.pages.len());

    Ok(())
}

/// Builds session parameters from the configuration file and CLI flags
///
/// Flags take precedence over file values.
fn apply_overrides(cli: &Cli, config: &Config) -> website_scraper::ScrapeParameters {
    let mut params = config.parameters(cli.url.clone());

    if let Some(max_pages) = cli.max_pages {
        params.max_pages = max_pages;
    }
    if let Some(max_search_results) = cli.max_search_results {
        params.max_search_results = max_search_results;
    }
    if let Some(timeout) = cli.timeout {
        params.timeout = timeout;
    }
    if let Some(pause) = cli.pause {
        params.pause = pause;
    }
    if let Some(user_agent) = &cli.user_agent {
        params.user_agent = user_agent.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        params.concurrency = concurrency;
    }
    if cli.session_timeout.is_some() {
        params.session_timeout = cli.session_timeout;
    }

    params
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that `--json` output stays parseable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("website_scraper=info,warn"),
            1 => EnvFilter::new("website_scraper=debug,info"),
            2 => EnvFilter::new("website_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

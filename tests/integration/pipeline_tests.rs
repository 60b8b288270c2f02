//! Integration tests for complete scraping sessions
//!
//! A mock site server and a mock search server stand in for the target
//! site and the DuckDuckGo endpoints.

use std::time::Duration;
use url::Url;
use website_scraper::chain::Registry;
use website_scraper::crawler::HttpSettings;
use website_scraper::output::layout::Sheet;
use website_scraper::output::DocumentBackend;
use website_scraper::{
    BackendError, ConfigError, DocumentExporter, ExportError, ScrapeParameters, Scraper,
    SearchChain,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

/// Site with `/` -> `/a`, plus `/orphan` reachable only through search
async fn start_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", r#"<p>Welcome home</p><a href="/a">A</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page("Page A", "Alpha"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orphan"))
        .respond_with(html_page("Orphan", "Found by search"))
        .mount(&server)
        .await;

    server
}

fn domain_of(server: &MockServer) -> String {
    let url = Url::parse(&server.uri()).unwrap();
    format!("{}:{}", url.host_str().unwrap(), url.port().unwrap())
}

fn settings() -> HttpSettings {
    HttpSettings {
        user_agent: "TestBot/1.0".to_string(),
        timeout: Duration::from_secs(5),
    }
}

/// Search chain pointed at the mock search server
fn search_chain(search: &MockServer) -> SearchChain {
    let html = Url::parse(&format!("{}/html/", search.uri())).unwrap();
    let lite = Url::parse(&format!("{}/lite/", search.uri())).unwrap();
    SearchChain::new(SearchChain::backends_with_endpoints(
        &settings(),
        Some(html),
        Some(lite),
    ))
}

fn params(site: &MockServer) -> ScrapeParameters {
    let mut params = ScrapeParameters::new(site.uri());
    params.pause = 0.0;
    params.timeout = 5.0;
    params.user_agent = "TestBot/1.0".to_string();
    params
}

fn encode(target: &str) -> String {
    url::form_urlencoded::byte_serialize(target.as_bytes()).collect()
}

struct BrokenBackend;

impl DocumentBackend for BrokenBackend {
    fn render(&self, _sheets: &[Sheet], _title: &str) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::Render("broken".to_string()))
    }
}

struct SheetCounter;

impl DocumentBackend for SheetCounter {
    fn render(&self, sheets: &[Sheet], _title: &str) -> Result<Vec<u8>, BackendError> {
        Ok(format!("{} sheets", sheets.len()).into_bytes())
    }
}

#[tokio::test]
async fn test_search_results_become_seeds() {
    let site = start_site().await;
    let search = MockServer::start().await;
    let domain = domain_of(&site);

    let results = format!(
        r#"<html><body>
            <a href="/settings">Settings</a>
            <a class="result__a" href="//duckduckgo.com/l/?uddg={}&rut=x">Orphan</a>
            <a class="result__a" href="https://other.example.net/">Other site</a>
            <a class="result__a" href="{}/">Home again</a>
        </body></html>"#,
        encode(&format!("{}/orphan", site.uri())),
        site.uri()
    );
    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", format!("site:{}", domain)))
        .respond_with(ResponseTemplate::new(200).set_body_string(results))
        .expect(1)
        .mount(&search)
        .await;
    Mock::given(method("GET"))
        .and(path("/lite/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&search)
        .await;

    let outcome = Scraper::new(params(&site))
        .with_search_chain(search_chain(&search))
        .with_document_exporter(DocumentExporter::new(
            Registry::new().register("counter", Box::new(SheetCounter) as Box<dyn DocumentBackend>),
        ))
        .run()
        .await
        .expect("session should run");

    assert_eq!(outcome.domain, domain);
    assert_eq!(
        outcome.seeds,
        vec![format!("{}/", site.uri()), format!("{}/orphan", site.uri())]
    );

    let titles: Vec<&str> = outcome.pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "Orphan", "Page A"]);
    assert!(outcome.pages.iter().all(|p| p.url.starts_with(&site.uri())));

    assert_eq!(outcome.document_strategy(), "counter");
    assert_eq!(outcome.document.as_ref().unwrap().bytes, b"3 sheets");

    let separator = format!("\n\n{}\n\n", "=".repeat(80));
    let segments: Vec<&str> = outcome
        .rendered_text
        .split(separator.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    assert_eq!(segments.len(), 3);
    assert!(segments[1].contains("# Orphan") && segments[1].contains("Found by search"));
}

#[tokio::test]
async fn test_search_outage_crawls_from_start_url() {
    let site = start_site().await;
    let search = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&search)
        .await;

    let outcome = Scraper::new(params(&site))
        .with_search_chain(search_chain(&search))
        .with_document_exporter(DocumentExporter::new(
            Registry::new().register("counter", Box::new(SheetCounter) as Box<dyn DocumentBackend>),
        ))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.seeds, vec![format!("{}/", site.uri())]);
    let titles: Vec<&str> = outcome.pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "Page A"]);
}

#[tokio::test]
async fn test_document_failure_still_produces_text() {
    let site = start_site().await;
    let search = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&search)
        .await;

    let exporter = DocumentExporter::new(
        Registry::new().register("broken", Box::new(BrokenBackend) as Box<dyn DocumentBackend>),
    );
    let outcome = Scraper::new(params(&site))
        .with_search_chain(search_chain(&search))
        .with_document_exporter(exporter)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.pages.len(), 2);
    assert!(outcome.rendered_text.contains("# Home\n"));
    assert!(matches!(outcome.document, Err(ExportError::Exhausted { .. })));
    assert_eq!(outcome.document_as_base64(), "");

    let dir = tempfile::tempdir().unwrap();
    let paths = outcome
        .write_artifacts(dir.path(), "scraped_content.txt", "scraped_content.pdf")
        .unwrap();
    assert!(paths.text.exists());
    assert!(paths.document.is_none());
}

#[tokio::test]
async fn test_document_backend_fallback() {
    let site = start_site().await;
    let search = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&search)
        .await;

    let exporter = DocumentExporter::new(
        Registry::new()
            .register_unavailable("missing", "not compiled in")
            .register("broken", Box::new(BrokenBackend) as Box<dyn DocumentBackend>)
            .register("counter", Box::new(SheetCounter) as Box<dyn DocumentBackend>),
    );
    let outcome = Scraper::new(params(&site))
        .with_search_chain(search_chain(&search))
        .with_document_exporter(exporter)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.document_strategy(), "counter");
}

#[cfg(feature = "pdf-writer")]
#[tokio::test]
async fn test_default_document_is_pdf() {
    let site = start_site().await;
    let search = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&search)
        .await;

    let outcome = Scraper::new(params(&site))
        .with_search_chain(search_chain(&search))
        .run()
        .await
        .unwrap();

    let document = outcome.document.as_ref().unwrap();
    assert_eq!(document.strategy, "pdf-writer");
    assert!(document.bytes.starts_with(b"%PDF"));

    let dir = tempfile::tempdir().unwrap();
    let paths = outcome
        .write_artifacts(dir.path(), "scraped_content.txt", "scraped_content.pdf")
        .unwrap();
    let written = std::fs::read(paths.document.unwrap()).unwrap();
    assert!(written.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_unreachable_site_yields_empty_outcome() {
    let site = MockServer::start().await;
    let search = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&search)
        .await;

    let outcome = Scraper::new(params(&site))
        .with_search_chain(search_chain(&search))
        .run()
        .await
        .unwrap();

    assert!(outcome.pages.is_empty());
    assert_eq!(outcome.rendered_text, "");
    assert_eq!(outcome.document_strategy(), "");
    assert_eq!(outcome.stats.failed, 1);
}

#[tokio::test]
async fn test_invalid_parameters_make_no_requests() {
    let site = MockServer::start().await;
    let search = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&search)
        .await;

    let mut bad = params(&site);
    bad.max_search_results = 500;
    let err = Scraper::new(bad)
        .with_search_chain(search_chain(&search))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigError::Validation(_)));
}

#[tokio::test]
async fn test_session_timeout_stops_slow_crawl() {
    let site = MockServer::start().await;
    let search = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page("Slow", "zzz").set_delay(Duration::from_secs(4)))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&search)
        .await;

    let mut p = params(&site);
    p.session_timeout = Some(0.5);

    let started = std::time::Instant::now();
    let outcome = Scraper::new(p)
        .with_search_chain(search_chain(&search))
        .run()
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(outcome.pages.is_empty());
    assert!(outcome.stats.cancelled);
}

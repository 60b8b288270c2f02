//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full fetch and crawl cycle end-to-end.

use std::time::Duration;
use url::Url;
use website_scraper::chain::Registry;
use website_scraper::crawler::{FetchBackend, HttpSettings, ReqwestBackend};
use website_scraper::{CrawlEngine, FetchChain, ScrapeParameters};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_settings() -> HttpSettings {
    HttpSettings {
        user_agent: "TestBot/1.0".to_string(),
        timeout: Duration::from_secs(5),
    }
}

/// A chain with the single async reqwest backend, so request counts are exact
fn single_backend_chain() -> FetchChain {
    let registry = Registry::new().register_result(
        ReqwestBackend::NAME,
        ReqwestBackend::new(&test_settings()).map(|b| Box::new(b) as Box<dyn FetchBackend>),
    );
    FetchChain::new(registry, Duration::ZERO)
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(title, body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let external = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        &format!(
            r#"<p>Welcome</p><a href="/page1">Page 1</a><a href="{}/page2">Page 2</a>
               <a href="{}/elsewhere">External</a>"#,
            base_url,
            external.uri()
        ),
    )
    .await;
    mount_page(&mock_server, "/page1", "Page 1", r#"Content 1 <a href="/">Home</a>"#).await;
    mount_page(&mock_server, "/page2", "Page 2", r#"Content 2 <a href="/page1#top">Again</a>"#).await;

    // The external server must never be contacted
    Mock::given(method("GET"))
        .respond_with(html_page("External", ""))
        .expect(0)
        .mount(&external)
        .await;

    let base = Url::parse(&base_url).expect("Failed to parse base URL");
    let engine = CrawlEngine::new(base, single_backend_chain(), 10);
    let report = engine.scrape(&[base_url.as_str()]).await;

    let urls: Vec<String> = report.pages.iter().map(|p| p.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base_url),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
        ]
    );
    assert_eq!(report.pages[0].title, "Home");
    assert_eq!(report.pages[0].text, "Home\nWelcome\nPage 1\nPage 2\nExternal");
    assert_eq!(report.pages[1].fetch_strategy, "reqwest");
    assert_eq!(report.stats.fetched, 3);
    assert_eq!(report.stats.failed, 0);
}

#[tokio::test]
async fn test_failed_page_is_skipped_and_never_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        r#"<a href="/broken">Broken</a><a href="/ok">Ok</a>"#,
    )
    .await;
    mount_page(&mock_server, "/ok", "Ok", r#"<a href="/broken">Broken again</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base = Url::parse(&base_url).unwrap();
    let report = CrawlEngine::new(base, single_backend_chain(), 10)
        .scrape(&[base_url.as_str()])
        .await;

    let titles: Vec<&str> = report.pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "Ok"]);
    assert_eq!(report.stats.failed, 1);
}

#[tokio::test]
async fn test_page_budget_bounds_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        r#"<a href="/p1">1</a><a href="/p2">2</a><a href="/p3">3</a><a href="/p4">4</a>"#,
    )
    .await;
    mount_page(&mock_server, "/p1", "P1", "one").await;

    for route in ["/p2", "/p3", "/p4"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html_page("Unreached", ""))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let base = Url::parse(&base_url).unwrap();
    let report = CrawlEngine::new(base, single_backend_chain(), 2)
        .with_concurrency(4)
        .scrape(&[base_url.as_str()])
        .await;

    assert_eq!(report.pages.len(), 2);
    let remaining: Vec<&str> = report
        .remaining_frontier
        .iter()
        .map(|u| u.as_url().path())
        .collect();
    assert_eq!(remaining, vec!["/p2", "/p3", "/p4"]);
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0"))
        .respond_with(html_page("Home", "hello"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = single_backend_chain()
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .expect("fetch should succeed");

    assert_eq!(result.status_code, 200);
    assert!(result.content.contains("hello"));
}

#[tokio::test]
async fn test_default_chain_falls_back_and_reports_last_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut params = ScrapeParameters::new(mock_server.uri());
    params.pause = 0.0;
    params.timeout = 5.0;
    let chain = FetchChain::from_params(&params);

    let err = chain
        .fetch(&format!("{}/gone", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("/gone"));
    assert!(matches!(
        err.last,
        Some(website_scraper::BackendError::Status { status: 404, .. })
    ));

    // Every available backend was attempted exactly once
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), chain.backends().available_count());
}

//! Integration tests for site audits
//!
//! These tests use wiremock as the fetch relay and run the full crawl cycle
//! end-to-end: robots.txt, sitemap discovery, sampling, page fetching and
//! scoring.

use cdn_audit::config::Config;
use cdn_audit::crawler::{CrawlOutcome, CrawlReport, Orchestrator};
use cdn_audit::state::CrawlPhase;
use cdn_audit::AuditError;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE: &str = "https://shop.test";

/// Creates a test configuration pointing at the mock relay
fn create_test_config(relay: &MockServer) -> Config {
    let mut config = Config::default();
    config.relay.endpoint = Some(format!("{}/proxy", relay.uri()));
    config.crawl.inter_page_delay_ms = 10; // Very short for testing
    config.crawl.page_timeout_ms = 2_000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn page_url(i: usize) -> String {
    format!("{}/page-{}", SITE, i)
}

fn asset_url(i: usize) -> String {
    format!(
        "https://res.cloudinary.com/demo/image/upload/f_auto,q_auto/page-{}.jpg",
        i
    )
}

fn page_html(i: usize) -> String {
    format!(
        r#"<html><head><title>Page {i}</title></head><body>
        <img src="{asset}" alt="">
        </body></html>"#,
        i = i,
        asset = asset_url(i)
    )
}

fn urlset(pages: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for page in pages {
        xml.push_str(&format!("\n  <url><loc>{}</loc></url>", page));
    }
    xml.push_str("\n</urlset>");
    xml
}

/// Mounts a relay response for one target URL
async fn mount_target(server: &MockServer, target: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(query_param("url", target))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a default-location sitemap listing `count` pages, each with one asset
async fn mount_site(server: &MockServer, count: usize) -> Vec<String> {
    let pages: Vec<String> = (1..=count).map(page_url).collect();
    mount_target(
        server,
        &format!("{}/sitemap.xml", SITE),
        ResponseTemplate::new(200).set_body_string(urlset(&pages)),
    )
    .await;
    pages
}

async fn mount_pages(server: &MockServer, pages: &[String], skip: &[usize]) {
    for (index, page) in pages.iter().enumerate() {
        let i = index + 1;
        if skip.contains(&i) {
            continue;
        }
        mount_target(
            server,
            page,
            ResponseTemplate::new(200)
                .set_body_string(page_html(i))
                .insert_header("content-type", "text/html"),
        )
        .await;
    }
}

fn expect_done(outcome: CrawlOutcome) -> CrawlReport {
    match outcome {
        CrawlOutcome::Done(report) => report,
        CrawlOutcome::Cancelled(state) => panic!("crawl unexpectedly cancelled: {:?}", state),
    }
}

#[tokio::test]
async fn test_large_sitemap_is_sampled() {
    let relay = MockServer::start().await;
    let pages = mount_site(&relay, 37).await;
    mount_pages(&relay, &pages, &[]).await;

    let orchestrator = Orchestrator::new(create_test_config(&relay))
        .expect("Failed to create orchestrator")
        .with_seed(11);
    let token = CancellationToken::new();

    let report = expect_done(orchestrator.run(SITE, &token).await.expect("Crawl failed"));

    let planned: HashSet<&String> = report.state.pages_planned.iter().collect();
    assert_eq!(report.state.pages_planned.len(), 10);
    assert_eq!(planned.len(), 10, "sampled pages must be distinct");
    assert!(planned.iter().all(|p| pages.contains(p)));
    assert_eq!(report.state.completed.len(), 10);
    assert!(report.state.failed.is_empty());
    assert_eq!(report.state.total_pages_discovered, 37);
    assert_eq!(report.state.phase, CrawlPhase::Done);

    let sampling = report.analysis.sampling.as_ref().expect("missing sampling info");
    assert_eq!(sampling.pages_sampled, 10);
    assert_eq!(sampling.total_pages_in_sitemap, 37);
    assert_eq!(sampling.percentage, "27.0");

    // One asset per sampled page, each attributed to its page
    assert_eq!(report.analysis.per_asset.len(), 10);
    for asset in &report.analysis.per_asset {
        let page = asset.page_url.as_ref().expect("asset without page");
        assert!(planned.contains(page));
    }
    assert!(report.finished_at >= report.started_at);
}

#[tokio::test]
async fn test_cancellation_stops_fetching() {
    let relay = MockServer::start().await;
    let pages = mount_site(&relay, 10).await;
    mount_pages(&relay, &pages, &[]).await;

    let orchestrator = Orchestrator::new(create_test_config(&relay)).unwrap();
    let token = CancellationToken::new();
    let trigger = token.clone();

    let outcome = orchestrator
        .run_with_progress(SITE, &token, move |state| {
            if state.completed.len() == 3 {
                trigger.cancel();
            }
        })
        .await
        .expect("Crawl failed");

    let state = match outcome {
        CrawlOutcome::Cancelled(state) => state,
        CrawlOutcome::Done(_) => panic!("expected the crawl to be cancelled"),
    };
    assert!(state.cancelled);
    assert_eq!(state.phase, CrawlPhase::Cancelled);
    assert_eq!(state.completed.len(), 3);
    assert_eq!(state.pages_planned.len(), 10);

    // No fetch was issued after the third page
    let requests = relay.received_requests().await.expect("request recording disabled");
    let page_fetches = requests
        .iter()
        .filter(|r| {
            r.url
                .query_pairs()
                .any(|(k, v)| k == "url" && v.contains("/page-"))
        })
        .count();
    assert_eq!(page_fetches, 3);
}

#[tokio::test]
async fn test_forbidden_page_does_not_abort_crawl() {
    let relay = MockServer::start().await;
    let pages = mount_site(&relay, 10).await;
    mount_pages(&relay, &pages, &[4]).await;
    mount_target(
        &relay,
        &page_url(4),
        ResponseTemplate::new(403)
            .set_body_json(serde_json::json!({ "error": "Upstream responded with 403" })),
    )
    .await;

    let orchestrator = Orchestrator::new(create_test_config(&relay)).unwrap();
    let token = CancellationToken::new();

    let report = expect_done(orchestrator.run(SITE, &token).await.unwrap());

    assert_eq!(report.state.failed.len(), 1);
    assert_eq!(report.state.failed[0].url, page_url(4));
    assert!(report.state.failed[0].error.contains("Access denied"));
    assert!(report.state.failed[0].error.contains("Upstream responded with 403"));
    assert_eq!(report.state.completed.len(), 9);

    let urls: Vec<&str> = report.analysis.per_asset.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls.len(), 9);
    assert!(!urls.contains(&asset_url(4).as_str()));
    assert_eq!(report.analysis.score, 100);
}

#[tokio::test]
async fn test_sitemap_index_follows_first_child() {
    let relay = MockServer::start().await;
    mount_target(
        &relay,
        &format!("{}/robots.txt", SITE),
        ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nAllow: /\nSitemap: {}/sitemap_index.xml\n",
            SITE
        )),
    )
    .await;
    mount_target(
        &relay,
        &format!("{}/sitemap_index.xml", SITE),
        ResponseTemplate::new(200).set_body_string(format!(
            r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{site}/sitemap-pages.xml</loc></sitemap>
  <sitemap><loc>{site}/sitemap-posts.xml</loc></sitemap>
</sitemapindex>"#,
            site = SITE
        )),
    )
    .await;

    let pages: Vec<String> = (1..=3).map(page_url).collect();
    mount_target(
        &relay,
        &format!("{}/sitemap-pages.xml", SITE),
        ResponseTemplate::new(200).set_body_string(urlset(&pages)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(query_param("url", format!("{}/sitemap-posts.xml", SITE).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[page_url(99)])))
        .expect(0)
        .mount(&relay)
        .await;
    mount_pages(&relay, &pages, &[]).await;

    let orchestrator = Orchestrator::new(create_test_config(&relay)).unwrap();
    let token = CancellationToken::new();

    let report = expect_done(orchestrator.run(SITE, &token).await.unwrap());

    assert_eq!(report.state.total_pages_discovered, 3);
    assert_eq!(report.state.pages_planned, pages);
    assert_eq!(report.analysis.sampling.as_ref().unwrap().percentage, "100.0");
}

#[tokio::test]
async fn test_empty_declared_sitemap_falls_back_to_default() {
    let relay = MockServer::start().await;
    mount_target(
        &relay,
        &format!("{}/robots.txt", SITE),
        ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nAllow: /\nSitemap: {}/sitemap-empty.xml\n",
            SITE
        )),
    )
    .await;
    mount_target(
        &relay,
        &format!("{}/sitemap-empty.xml", SITE),
        ResponseTemplate::new(200).set_body_string(urlset(&[])),
    )
    .await;
    let pages = mount_site(&relay, 2).await;
    mount_pages(&relay, &pages, &[]).await;

    let orchestrator = Orchestrator::new(create_test_config(&relay)).unwrap();
    let token = CancellationToken::new();

    let report = expect_done(orchestrator.run(SITE, &token).await.unwrap());

    assert_eq!(report.state.pages_planned, pages);
    assert_eq!(report.state.total_pages_discovered, 2);
    assert_eq!(report.analysis.per_asset.len(), 2);
}

#[tokio::test]
async fn test_nested_sitemap_index_is_not_followed() {
    let relay = MockServer::start().await;
    mount_target(
        &relay,
        &format!("{}/sitemap.xml", SITE),
        ResponseTemplate::new(200).set_body_string(format!(
            "<sitemapindex><sitemap><loc>{}/sitemap-nested.xml</loc></sitemap></sitemapindex>",
            SITE
        )),
    )
    .await;
    mount_target(
        &relay,
        &format!("{}/sitemap-nested.xml", SITE),
        ResponseTemplate::new(200).set_body_string(format!(
            "<sitemapindex><sitemap><loc>{}/sitemap-deep.xml</loc></sitemap></sitemapindex>",
            SITE
        )),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(query_param("url", format!("{}/sitemap-deep.xml", SITE).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[page_url(1)])))
        .expect(0)
        .mount(&relay)
        .await;
    mount_target(
        &relay,
        &format!("{}/", SITE),
        ResponseTemplate::new(200).set_body_string(page_html(0)),
    )
    .await;

    let orchestrator = Orchestrator::new(create_test_config(&relay)).unwrap();
    let token = CancellationToken::new();

    let report = expect_done(orchestrator.run(SITE, &token).await.unwrap());

    assert_eq!(report.state.pages_planned, vec![format!("{}/", SITE)]);
    assert!(report.analysis.sampling.is_none());
    assert_eq!(report.analysis.per_asset.len(), 1);
}

#[tokio::test]
async fn test_missing_sitemap_audits_single_page() {
    let relay = MockServer::start().await;
    mount_target(
        &relay,
        &format!("{}/", SITE),
        ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <img src="https://res.cloudinary.com/demo/image/upload/hero.jpg">
            <img src="/media/logo.png">
            </body></html>"#,
        ),
    )
    .await;

    let orchestrator = Orchestrator::new(create_test_config(&relay)).unwrap();
    let token = CancellationToken::new();

    let report = expect_done(orchestrator.run("shop.test", &token).await.unwrap());

    assert_eq!(report.state.pages_planned, vec![format!("{}/", SITE)]);
    assert!(report.analysis.sampling.is_none());
    assert_eq!(report.analysis.per_asset.len(), 1);
    assert_eq!(
        report.analysis.per_asset[0].page_url.as_deref(),
        Some("https://shop.test/")
    );
    assert_eq!(
        report.analysis.non_cdn_media_assets,
        vec!["https://shop.test/media/logo.png".to_string()]
    );
}

#[tokio::test]
async fn test_single_page_failure_is_reported() {
    let relay = MockServer::start().await;
    mount_target(
        &relay,
        &format!("{}/", SITE),
        ResponseTemplate::new(429).set_body_json(serde_json::json!({ "error": "Too many requests" })),
    )
    .await;

    let mut config = create_test_config(&relay);
    config.crawl.use_sitemap = false;
    let orchestrator = Orchestrator::new(config).unwrap();
    let token = CancellationToken::new();

    let err = orchestrator.run(SITE, &token).await.unwrap_err();
    match err {
        AuditError::PageFetch { url, status, message } => {
            assert_eq!(url, format!("{}/", SITE));
            assert_eq!(status, Some(429));
            assert!(message.contains("Rate limited"));
        }
        other => panic!("expected PageFetch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_all_pages_failing_still_compiles() {
    let relay = MockServer::start().await;
    let pages = mount_site(&relay, 3).await;
    for page in &pages {
        mount_target(&relay, page, ResponseTemplate::new(503)).await;
    }

    let orchestrator = Orchestrator::new(create_test_config(&relay)).unwrap();
    let token = CancellationToken::new();

    let report = expect_done(orchestrator.run(SITE, &token).await.unwrap());

    assert_eq!(report.state.phase, CrawlPhase::Done);
    assert_eq!(report.state.failed.len(), 3);
    assert!(report.state.completed.is_empty());
    assert_eq!(report.analysis.score, 0);
    assert!(report.analysis.per_asset.is_empty());
    assert!(report.state.failed[0].error.contains("HTTP 503"));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let relay = MockServer::start().await;
    let pages = mount_site(&relay, 2).await;
    mount_pages(&relay, &pages, &[1]).await;
    mount_target(
        &relay,
        &page_url(1),
        ResponseTemplate::new(200)
            .set_body_string(page_html(1))
            .set_delay(std::time::Duration::from_millis(1_500)),
    )
    .await;

    let mut config = create_test_config(&relay);
    config.crawl.page_timeout_ms = 300;
    let orchestrator = Orchestrator::new(config).unwrap();
    let token = CancellationToken::new();

    let report = expect_done(orchestrator.run(SITE, &token).await.unwrap());

    assert_eq!(report.state.failed.len(), 1);
    assert_eq!(report.state.failed[0].url, page_url(1));
    assert!(report.state.failed[0].error.contains("timed out"));
    assert_eq!(report.state.completed, vec![page_url(2)]);
}

#[tokio::test]
async fn test_robots_disallowed_pages_are_not_sampled() {
    let relay = MockServer::start().await;
    mount_target(
        &relay,
        &format!("{}/robots.txt", SITE),
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
    )
    .await;
    let pages = vec![
        page_url(1),
        format!("{}/private/report", SITE),
        page_url(2),
    ];
    mount_target(
        &relay,
        &format!("{}/sitemap.xml", SITE),
        ResponseTemplate::new(200).set_body_string(urlset(&pages)),
    )
    .await;
    mount_pages(&relay, &[page_url(1), page_url(2)], &[]).await;

    let orchestrator = Orchestrator::new(create_test_config(&relay)).unwrap();
    let token = CancellationToken::new();

    let report = expect_done(orchestrator.run(SITE, &token).await.unwrap());

    assert_eq!(report.state.pages_planned, vec![page_url(1), page_url(2)]);
    assert_eq!(report.state.total_pages_discovered, 3);
    assert_eq!(report.analysis.sampling.as_ref().unwrap().percentage, "66.7");
}

#[tokio::test]
async fn test_invalid_site_url_makes_no_requests() {
    let relay = MockServer::start().await;
    let orchestrator = Orchestrator::new(create_test_config(&relay)).unwrap();
    let token = CancellationToken::new();

    let err = orchestrator.run("mailto:owner@shop.test", &token).await.unwrap_err();

    assert!(matches!(err, AuditError::InvalidSiteUrl { .. }));
    let requests = relay.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

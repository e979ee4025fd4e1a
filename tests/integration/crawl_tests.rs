//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise the full
//! crawl cycle end-to-end.

use super::{mount_page, pdf, sample_pdf, test_config};
use scoped_harvest::{Coordinator, CrawlLimits};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn limits(page_limit: usize, document_limit: usize) -> CrawlLimits {
    CrawlLimits {
        page_limit,
        document_limit,
        path_must_contain: None,
    }
}

#[tokio::test]
async fn test_crawl_stays_in_scope() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/cards/x",
        r#"<p>Card X overview with rewards</p>
        <a href="/cards/x/fees">Fees and charges</a>
        <a href="/other/benefits">Other benefits</a>
        <a href="https://example.org/cards/x/offers">Partner offers</a>"#,
    )
    .await;
    mount_page(&mock_server, "/cards/x/fees", "<p>Annual fee is 500</p>").await;

    Mock::given(method("GET"))
        .and(path("/other/benefits"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(test_config()).unwrap();
    let result = coordinator
        .crawl(&format!("{}/cards/x", base_url), 1, &limits(10, 10))
        .await
        .unwrap();

    let urls: Vec<&str> = result.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/cards/x", base_url),
            format!("{}/cards/x/fees", base_url)
        ]
    );
    assert!(result
        .aggregated_text
        .contains(&format!("[PAGE:{}/cards/x/fees]\nAnnual fee is 500", base_url)));
    assert!(!result.aggregated_text.contains("/other"));
}

#[tokio::test]
async fn test_shared_document_queued_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/cards/x",
        r#"<p>Card X overview</p>
        <a href="/cards/x/features">Features</a>
        <a href="/cards/x/benefits">Benefits</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/cards/x/features",
        r#"<p>Lounge access</p><a href="/cards/x/terms.pdf">Terms</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/cards/x/benefits",
        r#"<p>Reward points</p><a href="/cards/x/terms.pdf#page=2">Terms again</a>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/cards/x/terms.pdf"))
        .respond_with(pdf(sample_pdf(2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(test_config()).unwrap();
    let result = coordinator
        .harvest(&format!("{}/cards/x", base_url), 2, &limits(10, 10))
        .await
        .unwrap();

    assert_eq!(result.discovered_documents.len(), 1);
    assert_eq!(
        result.discovered_documents[0].referer.as_deref(),
        Some(format!("{}/cards/x/features", base_url).as_str())
    );
    assert_eq!(result.document_outcomes.len(), 1);
    assert!(result.document_outcomes[0].is_success());
    assert_eq!(result.aggregated_text.matches("[DOCUMENT:").count(), 1);
    assert!(result.aggregated_text.contains("[PAGE 1]\n"));
}

#[tokio::test]
async fn test_page_timeout_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/cards/x",
        r#"<p>Card X overview</p>
        <a href="/cards/x/slow">Slow benefits</a>
        <a href="/cards/x/fees">Fees</a>"#,
    )
    .await;
    mount_page(&mock_server, "/cards/x/fees", "<p>Annual fee is 500</p>").await;

    Mock::given(method("GET"))
        .and(path("/cards/x/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Too late</body></html>")
                .set_delay(Duration::from_secs(2)),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.http.page_timeout_ms = 200;

    let coordinator = Coordinator::new(config).unwrap();
    let result = coordinator
        .crawl(&format!("{}/cards/x", base_url), 2, &limits(10, 10))
        .await
        .unwrap();

    let slow = result
        .pages
        .iter()
        .find(|p| p.url.ends_with("/cards/x/slow"))
        .unwrap();
    assert_eq!(slow.text_chars, 0);
    assert!(!result.aggregated_text.contains("/cards/x/slow]"));
    assert!(result.aggregated_text.contains("Annual fee is 500"));
}

#[tokio::test]
async fn test_not_found_page_contributes_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/cards/x",
        r#"<p>Card X overview</p><a href="/cards/x/missing">Offers</a>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/cards/x/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(test_config()).unwrap();
    let result = coordinator
        .crawl(&format!("{}/cards/x", base_url), 2, &limits(10, 10))
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.aggregated_text.matches("[PAGE:").count(), 1);
}

#[tokio::test]
async fn test_limits_and_depth_invariants() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let children: String = (0..6)
        .map(|i| format!(r#"<a href="/cards/x/c{}">Feature {}</a>"#, i, i))
        .collect();
    mount_page(
        &mock_server,
        "/cards/x",
        &format!("<p>Root page text</p>{}", children),
    )
    .await;

    for i in 0..6 {
        let grandchildren: String = (0..3)
            .map(|j| format!(r#"<a href="/cards/x/c{}/g{}">Detail {}</a>"#, i, j, j))
            .collect();
        mount_page(
            &mock_server,
            &format!("/cards/x/c{}", i),
            &format!("<p>Child page {}</p>{}<a href=\"/cards/x\">Back</a>", i, grandchildren),
        )
        .await;
    }

    let coordinator = Coordinator::new(test_config()).unwrap();
    let result = coordinator
        .crawl(&format!("{}/cards/x", base_url), 1, &limits(4, 10))
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 4);

    let depths: HashMap<&str, u32> = result
        .pages
        .iter()
        .map(|p| (p.url.as_str(), p.depth))
        .collect();
    for page in &result.pages {
        assert!(page.depth <= 1);
        match &page.parent {
            None => assert_eq!(page.depth, 0),
            Some(parent) => assert_eq!(page.depth, depths[parent.as_str()] + 1),
        }
    }

    let mut tags = HashSet::new();
    for line in result.aggregated_text.lines() {
        if line.starts_with("[PAGE:") {
            assert!(tags.insert(line.to_string()), "duplicate tag {}", line);
        }
    }
    assert_eq!(tags.len(), 4);
}

#[tokio::test]
async fn test_document_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (0..5)
        .map(|i| format!(r#"<a href="/cards/x/doc{}.pdf">Doc {}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/cards/x", &format!("<p>Documents</p>{}", links)).await;

    let coordinator = Coordinator::new(test_config()).unwrap();
    let result = coordinator
        .crawl(&format!("{}/cards/x", base_url), 2, &limits(10, 3))
        .await
        .unwrap();

    let urls: Vec<String> = result
        .discovered_documents
        .iter()
        .map(|d| d.url.to_string())
        .collect();
    assert_eq!(
        urls,
        (0..3)
            .map(|i| format!("{}/cards/x/doc{}.pdf", base_url, i))
            .collect::<Vec<_>>()
    );
    assert!(result.document_outcomes.is_empty());
}

#[tokio::test]
async fn test_independent_crawls_share_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/cards/x", "<p>Card X overview text</p>").await;
    mount_page(&mock_server, "/cards/y", "<p>Card Y overview text</p>").await;

    let coordinator = Coordinator::new(test_config()).unwrap();
    let url_x = format!("{}/cards/x", base_url);
    let url_y = format!("{}/cards/y", base_url);
    let shared_limits = limits(10, 10);
    let (x, y) = tokio::join!(
        coordinator.crawl(&url_x, 2, &shared_limits),
        coordinator.crawl(&url_y, 2, &shared_limits),
    );

    let x = x.unwrap();
    let y = y.unwrap();
    assert_eq!(x.pages.len(), 1);
    assert_eq!(y.pages.len(), 1);
    assert!(x.aggregated_text.contains("Card X"));
    assert!(y.aggregated_text.contains("Card Y"));
}

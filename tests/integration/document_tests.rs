//! Integration tests for document retrieval and extraction

use super::{mount_page, pdf, sample_pdf, test_config};
use scoped_harvest::config::RepositoryRewrite;
use scoped_harvest::crawler::build_http_client;
use scoped_harvest::documents::{extract_text, DocumentRetriever, DocumentStatus};
use scoped_harvest::{Coordinator, CrawlLimits, DownloadError};
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn retriever(config: &scoped_harvest::Config) -> DocumentRetriever {
    let client = build_http_client(&config.http).unwrap();
    DocumentRetriever::new(client, config)
}

#[tokio::test]
async fn test_lowercase_fallback_after_404() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/Cards/X/Terms.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cards/x/terms.pdf"))
        .and(header_exists("origin"))
        .and(header("referer", format!("{}/cards/x", base_url).as_str()))
        .respond_with(pdf(sample_pdf(3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config();
    let downloaded = retriever(&config)
        .fetch(
            &format!("{}/Cards/X/Terms.pdf", base_url),
            Some(&format!("{}/cards/x", base_url)),
        )
        .await
        .unwrap();

    assert_eq!(
        downloaded.source_url.as_str(),
        format!("{}/cards/x/terms.pdf", base_url)
    );

    let text = extract_text(&downloaded.bytes, 10).unwrap();
    assert!(text.contains("[PAGE 1]"));
    assert!(!text.trim().is_empty());
}

#[tokio::test]
async fn test_double_encoding_repaired() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/docs/My%20Card.pdf"))
        .respond_with(pdf(sample_pdf(1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config();
    let bytes = retriever(&config)
        .download(&format!("{}/docs/My%2520Card.pdf", base_url), None)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_non_404_failure_stops_fallbacks() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/Docs/A.pdf"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/a.pdf"))
        .respond_with(pdf(sample_pdf(1)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = test_config();
    let result = retriever(&config)
        .download(&format!("{}/Docs/A.pdf", base_url), None)
        .await;

    match result {
        Err(DownloadError::Exhausted {
            tried, last_error, ..
        }) => {
            assert_eq!(tried.len(), 1);
            assert_eq!(last_error, "HTTP 403");
        }
        other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn test_transient_errors_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/docs/a.pdf"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/a.pdf"))
        .respond_with(pdf(sample_pdf(1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config();
    let bytes = retriever(&config)
        .download(&format!("{}/docs/a.pdf", base_url), None)
        .await
        .unwrap();
    assert!(!bytes.is_empty());
}

#[tokio::test]
async fn test_all_shapes_missing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let config = test_config();
    let result = retriever(&config)
        .download(&format!("{}/Docs/Fee_Schedule.pdf", base_url), None)
        .await;

    match result {
        Err(DownloadError::Exhausted { tried, .. }) => {
            assert_eq!(
                tried,
                vec![
                    format!("{}/Docs/Fee_Schedule.pdf", base_url),
                    format!("{}/docs/fee_schedule.pdf", base_url),
                    format!("{}/docs/Fee_Schedule.pdf", base_url),
                    format!("{}/docs/fee-schedule.pdf", base_url),
                ]
            );
        }
        other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn test_repository_rewrite() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/Personal/Cards/Privilege/MITC.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/content/repositories/abc/"))
        .and(query_param("path", "/Personal/Cards/Privilege/MITC.pdf"))
        .respond_with(pdf(sample_pdf(1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.documents.repository = Some(RepositoryRewrite {
        path_prefix: "/Personal/Cards/".to_string(),
        repository_url: format!("{}/content/repositories/abc/", base_url),
        query_param: "path".to_string(),
    });

    let downloaded = retriever(&config)
        .fetch(
            &format!("{}/Personal/Cards/Privilege/MITC.pdf", base_url),
            None,
        )
        .await
        .unwrap();
    assert_eq!(downloaded.source_url.path(), "/content/repositories/abc/");
}

#[tokio::test]
async fn test_harvest_caps_pdf_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/cards/x",
        r#"<p>Card X overview</p><a href="/cards/x/mitc.pdf">Most important terms</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/cards/x/mitc.pdf"))
        .respond_with(pdf(sample_pdf(25)))
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(test_config()).unwrap();
    let result = coordinator
        .harvest(&format!("{}/cards/x", base_url), 2, &CrawlLimits::default())
        .await
        .unwrap();

    for n in 1..=10 {
        assert!(result.aggregated_text.contains(&format!("[PAGE {}]\n", n)));
    }
    for n in 11..=25 {
        assert!(!result.aggregated_text.contains(&format!("[PAGE {}]", n)));
    }
}

#[tokio::test]
async fn test_document_order_follows_discovery() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (0..5)
        .map(|i| format!(r#"<a href="/cards/x/doc{}.pdf">Doc {}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/cards/x", &format!("<p>Documents</p>{}", links)).await;

    // Earlier documents answer more slowly
    for i in 0..5u64 {
        Mock::given(method("GET"))
            .and(path(format!("/cards/x/doc{}.pdf", i)))
            .respond_with(
                pdf(sample_pdf(1)).set_delay(Duration::from_millis(150 - i * 30)),
            )
            .mount(&mock_server)
            .await;
    }

    let coordinator = Coordinator::new(test_config()).unwrap();
    let result = coordinator
        .harvest(&format!("{}/cards/x", base_url), 2, &CrawlLimits::default())
        .await
        .unwrap();

    let discovered: Vec<String> = result
        .discovered_documents
        .iter()
        .map(|d| d.url.to_string())
        .collect();
    let outcomes: Vec<String> = result
        .document_outcomes
        .iter()
        .map(|o| o.link.url.to_string())
        .collect();
    assert_eq!(discovered.len(), 5);
    assert_eq!(outcomes, discovered);

    let tag_positions: Vec<usize> = discovered
        .iter()
        .map(|url| {
            result
                .aggregated_text
                .find(&format!("[DOCUMENT:{}]", url))
                .unwrap()
        })
        .collect();
    assert!(tag_positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_unreadable_document_recorded_as_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/cards/x",
        r#"<p>Card X overview</p><a href="/cards/x/broken.pdf">Terms</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/cards/x/broken.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(test_config()).unwrap();
    let result = coordinator
        .harvest(&format!("{}/cards/x", base_url), 2, &CrawlLimits::default())
        .await
        .unwrap();

    assert_eq!(result.document_outcomes.len(), 1);
    assert!(matches!(
        result.document_outcomes[0].status,
        DocumentStatus::ExtractionFailed(_)
    ));
    assert!(!result.aggregated_text.contains("[DOCUMENT:"));
}

//! Extractor behavior against a local mock HTTP server.

use std::sync::{Arc, Mutex};

use httpmock::prelude::*;

use webrag::core::config::ExtractConfig;
use webrag::extract::{Extractor, HttpFetcher};

fn extractor(config: &ExtractConfig) -> Extractor {
    Extractor::new(Arc::new(HttpFetcher::new(config)), config.concurrency)
}

#[tokio::test]
async fn extracts_clean_text_with_source_marker() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/article");
            then.status(200)
                .header("content-type", "text/html")
                .body(
                    "<html><head><script>var tracker = 1;</script>\
                     <style>body { color: red; }</style></head>\
                     <body><h1>Rust   1.80</h1><p>released\n\n   today</p></body></html>",
                );
        })
        .await;

    let config = ExtractConfig::default();
    let url = server.url("/article");
    let document = extractor(&config).extract(&url).await.expect("document");

    assert_eq!(document.source_url, url);
    assert!(document.text.starts_with(&format!("Source: {url}")));
    assert!(document.text.contains("Rust 1.80 released today"));
    assert!(!document.text.contains("var tracker"));
    assert!(!document.text.contains("color"));
}

#[tokio::test]
async fn sends_the_configured_browser_identity() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/ua")
                .header("user-agent", webrag::core::config::DEFAULT_USER_AGENT);
            then.status(200).body("<p>agent checked</p>");
        })
        .await;

    let document = extractor(&ExtractConfig::default())
        .extract(&server.url("/ua"))
        .await;

    mock.assert_async().await;
    assert!(document.is_some());
}

#[tokio::test]
async fn non_success_status_yields_no_document() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gone");
            then.status(404).body("not here");
        })
        .await;

    let document = extractor(&ExtractConfig::default())
        .extract(&server.url("/gone"))
        .await;
    assert!(document.is_none());
}

#[tokio::test]
async fn empty_page_yields_no_document() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/empty");
            then.status(200).body("<html><body><script>only()</script></body></html>");
        })
        .await;

    let document = extractor(&ExtractConfig::default())
        .extract(&server.url("/empty"))
        .await;
    assert!(document.is_none());
}

#[tokio::test]
async fn batch_swallows_individual_failures() {
    let server = MockServer::start_async().await;
    for path in ["/a", "/c"] {
        let body = format!("<p>content for {path}</p>");
        server
            .mock_async(move |when, then| {
                when.method(GET).path(path);
                then.status(200).body(body);
            })
            .await;
    }
    server
        .mock_async(|when, then| {
            when.method(GET).path("/b");
            then.status(500).body("boom");
        })
        .await;

    let urls = vec![server.url("/a"), server.url("/b"), server.url("/c")];
    let progress: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = progress.clone();

    let (documents, succeeded_urls) = extractor(&ExtractConfig::default())
        .extract_all(
            &urls,
            Some(Arc::new(move |completed, total| {
                sink.lock().unwrap().push((completed, total));
            })),
        )
        .await;

    // One document per succeeded URL, both subsets of the input.
    assert_eq!(documents.len(), 2);
    assert_eq!(succeeded_urls.len(), documents.len());
    assert!(succeeded_urls.iter().all(|url| urls.contains(url)));
    assert!(!succeeded_urls.contains(&server.url("/b")));
    for (document, url) in documents.iter().zip(&succeeded_urls) {
        assert_eq!(&document.source_url, url);
    }

    // Progress fired once per URL, in completion order.
    let progress = progress.lock().unwrap();
    let completed: Vec<usize> = progress.iter().map(|(done, _)| *done).collect();
    assert_eq!(completed, vec![1, 2, 3]);
    assert!(progress.iter().all(|(_, total)| *total == 3));
}

#[tokio::test]
async fn all_failures_produce_an_empty_batch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(503);
        })
        .await;

    let urls = vec![server.url("/x"), server.url("/y")];
    let (documents, succeeded_urls) = extractor(&ExtractConfig::default())
        .extract_all(&urls, None)
        .await;

    assert!(documents.is_empty());
    assert!(succeeded_urls.is_empty());
}

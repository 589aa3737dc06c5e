//! Content extraction.
//!
//! Fetches pages over HTTP with a browser identity and reduces markup to
//! clean plain text. Batch extraction runs a bounded worker pool and
//! reports results in completion order; a single URL's failure never aborts
//! the batch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use scraper::{ElementRef, Html};
use serde::Serialize;

use crate::core::config::ExtractConfig;
use crate::core::errors::PipelineError;

/// Plain-text document extracted from one URL. A failed fetch produces no
/// document at all, never an empty one.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub source_url: String,
    pub text: String,
}

/// Boundary for raw page fetching.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body. Non-2xx statuses and transport failures are
    /// errors; the extractor treats all of them uniformly as "no content".
    async fn fetch(&self, url: &str) -> Result<String, PipelineError>;
}

/// reqwest-backed fetcher with a fixed per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, PipelineError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(PipelineError::internal)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Internal(format!(
                "fetch failed for {url}: {status}"
            )));
        }

        response.text().await.map_err(PipelineError::internal)
    }
}

/// Progress callback: (completed, total), invoked once per finished URL in
/// completion order.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

pub struct Extractor {
    fetcher: Arc<dyn PageFetcher>,
    concurrency: usize,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Extract one URL. A failed fetch or a page with no usable text yields
    /// `None`.
    pub async fn extract(&self, url: &str) -> Option<ExtractedDocument> {
        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!("Extraction skipped for {}: {}", url, err);
                return None;
            }
        };

        let text = html_to_text(&body);
        if text.is_empty() {
            tracing::debug!("Extraction yielded no text for {}", url);
            return None;
        }

        Some(ExtractedDocument {
            source_url: url.to_string(),
            text: format!("Source: {url}\n\n{text}"),
        })
    }

    /// Extract many URLs with a bounded worker pool.
    ///
    /// Returns the documents and the URLs that produced them, both in
    /// completion order (not submission order). Per-URL failures are
    /// swallowed; the result is empty only when every URL fails.
    pub async fn extract_all(
        &self,
        urls: &[String],
        progress: Option<ProgressFn>,
    ) -> (Vec<ExtractedDocument>, Vec<String>) {
        let total = urls.len();
        let mut documents = Vec::new();
        let mut succeeded_urls = Vec::new();
        if total == 0 {
            return (documents, succeeded_urls);
        }

        let mut completions = stream::iter(urls.to_vec())
            .map(|url| async move { self.extract(&url).await })
            .buffer_unordered(self.concurrency);

        let mut finished = 0usize;
        while let Some(outcome) = completions.next().await {
            finished += 1;
            if let Some(document) = outcome {
                succeeded_urls.push(document.source_url.clone());
                documents.push(document);
            }
            if let Some(report) = &progress {
                report(finished, total);
            }
        }

        tracing::info!("Extracted {}/{} pages", documents.len(), total);
        (documents, succeeded_urls)
    }
}

/// Reduce an HTML document to whitespace-normalized plain text, dropping
/// script and style subtrees.
fn html_to_text(body: &str) -> String {
    let document = Html::parse_document(body);
    let mut parts = Vec::new();
    collect_text(document.root_element(), &mut parts);
    parts
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    let name = element.value().name();
    if name == "script" || name == "style" || name == "noscript" {
        return;
    }
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push(text.to_string());
        }
    }
}

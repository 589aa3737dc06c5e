//! Web search boundary.
//!
//! Turns a query string into an ordered list of candidate pages via an
//! external search engine. The pipeline-facing client converts provider
//! failures into an empty result: "zero URLs" is a normal, checked outcome
//! for the orchestrator, never an exception.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::core::errors::PipelineError;

/// One search hit. The pipeline consumes `url`; title and snippet are kept
/// for caller display ("view sources").
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Boundary to an external search engine.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return up to `max_results` results, best first. Fewer (or none) is a
    /// valid response; transport errors are errors.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, PipelineError>;
}

/// DuckDuckGo Instant Answer API client.
pub struct DuckDuckGoSearch {
    base_url: String,
    client: reqwest::Client,
}

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self::with_base_url("https://api.duckduckgo.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, PipelineError> {
        let url = format!(
            "{}/?q={}&format=json&no_redirect=1&no_html=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(PipelineError::internal)?;

        if !response.status().is_success() {
            return Err(PipelineError::SearchUnavailable(format!(
                "DuckDuckGo search failed: {}",
                response.status()
            )));
        }

        let payload: Value = response.json().await.map_err(PipelineError::internal)?;
        let mut results = Vec::new();

        if let Some(abstract_text) = payload.get("AbstractText").and_then(|v| v.as_str()) {
            if let Some(url) = payload.get("AbstractURL").and_then(|v| v.as_str()) {
                if !abstract_text.is_empty() && !url.is_empty() {
                    results.push(SearchResult {
                        title: abstract_text
                            .split(" - ")
                            .next()
                            .unwrap_or(abstract_text)
                            .to_string(),
                        url: url.to_string(),
                        snippet: abstract_text.to_string(),
                    });
                }
            }
        }

        if let Some(items) = payload.get("Results").and_then(|v| v.as_array()) {
            extract_topics(items, &mut results);
        }
        if let Some(items) = payload.get("RelatedTopics").and_then(|v| v.as_array()) {
            extract_topics(items, &mut results);
        }

        results.truncate(max_results);
        Ok(results)
    }
}

fn extract_topics(items: &[Value], results: &mut Vec<SearchResult>) {
    for item in items {
        if let Some(topics) = item.get("Topics").and_then(|v| v.as_array()) {
            extract_topics(topics, results);
            continue;
        }
        let text = item.get("Text").and_then(|v| v.as_str()).unwrap_or("");
        let url = item.get("FirstURL").and_then(|v| v.as_str()).unwrap_or("");
        if text.is_empty() || url.is_empty() {
            continue;
        }
        results.push(SearchResult {
            title: text.split(" - ").next().unwrap_or(text).to_string(),
            url: url.to_string(),
            snippet: text.to_string(),
        });
    }
}

/// Pipeline-facing search client.
///
/// Caps the result count at `max_results` and flattens provider failures
/// into an empty list, which the orchestrator treats as its own terminal
/// state.
pub struct SearchClient {
    provider: Arc<dyn SearchProvider>,
}

impl SearchClient {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        match self.provider.search(query, max_results).await {
            Ok(mut results) => {
                results.truncate(max_results);
                results
            }
            Err(err) => {
                tracing::warn!("Web search failed: {}", err);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        count: usize,
    }

    #[async_trait]
    impl SearchProvider for FixedProvider {
        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
        ) -> Result<Vec<SearchResult>, PipelineError> {
            Ok((0..self.count)
                .map(|i| SearchResult {
                    title: format!("result {i}"),
                    url: format!("https://example.com/{i}"),
                    snippet: String::new(),
                })
                .collect())
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl SearchProvider for BrokenProvider {
        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
        ) -> Result<Vec<SearchResult>, PipelineError> {
            Err(PipelineError::SearchUnavailable("rate limited".to_string()))
        }
    }

    #[tokio::test]
    async fn never_returns_more_than_requested() {
        let client = SearchClient::new(Arc::new(FixedProvider { count: 20 }));
        for max_results in 3..=10 {
            let results = client.search("rust", max_results).await;
            assert!(results.len() <= max_results);
        }
    }

    #[tokio::test]
    async fn provider_failure_yields_empty_result() {
        let client = SearchClient::new(Arc::new(BrokenProvider));
        assert!(client.search("rust", 5).await.is_empty());
    }

    #[tokio::test]
    async fn fewer_results_than_requested_pass_through() {
        let client = SearchClient::new(Arc::new(FixedProvider { count: 2 }));
        assert_eq!(client.search("rust", 5).await.len(), 2);
    }
}

//! Typed configuration for the retrieval pipeline.
//!
//! All knobs are caller-supplied; `Default` values match the ranges the
//! pipeline was designed around. `RagConfig::validate` rejects values
//! outside those ranges before any network call is made.

use serde::{Deserialize, Serialize};

use crate::core::errors::PipelineError;

/// Browser identity sent with every page fetch.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of search results to request, 3..=10.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 5 }
    }
}

/// Page fetching and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Size of the bounded worker pool for parallel extraction.
    pub concurrency: usize,
    /// Per-fetch timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header for page fetches.
    pub user_agent: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Chunking settings for the per-query index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub chunk_overlap: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve, 2..=8.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Conversation memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Token budget for verbatim turns before compaction kicks in.
    pub token_limit: usize,
    /// Number of most recent turns kept verbatim through compaction.
    pub keep_recent_turns: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            token_limit: 2000,
            keep_recent_turns: 4,
        }
    }
}

/// Prompt assembly settings for the synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Include the conversation context block in the synthesis prompt.
    pub include_conversation_context: bool,
    /// Drop source tags from the prompt and forbid citations in the answer.
    pub suppress_citations: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            include_conversation_context: true,
            suppress_citations: false,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

impl RagConfig {
    /// Check every knob against its supported range.
    pub fn validate(&self) -> Result<(), PipelineError> {
        check_range("search.max_results", self.search.max_results, 3, 10)?;
        check_range("retrieval.top_k", self.retrieval.top_k, 2, 8)?;
        check_min("extract.concurrency", self.extract.concurrency, 1)?;
        check_min("extract.timeout_secs", self.extract.timeout_secs as usize, 1)?;
        check_min("index.chunk_size", self.index.chunk_size, 1)?;
        if self.index.chunk_overlap >= self.index.chunk_size {
            return Err(PipelineError::InvalidConfig(format!(
                "index.chunk_overlap must be smaller than index.chunk_size, got {} >= {}",
                self.index.chunk_overlap, self.index.chunk_size
            )));
        }
        check_min("memory.token_limit", self.memory.token_limit, 1)?;
        check_min("memory.keep_recent_turns", self.memory.keep_recent_turns, 1)?;
        Ok(())
    }
}

fn check_range(
    field: &str,
    value: usize,
    min: usize,
    max: usize,
) -> Result<(), PipelineError> {
    if value < min || value > max {
        return Err(PipelineError::InvalidConfig(format!(
            "{field} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

fn check_min(field: &str, value: usize, min: usize) -> Result<(), PipelineError> {
    if value < min {
        return Err(PipelineError::InvalidConfig(format!(
            "{field} must be at least {min}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RagConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_search_count() {
        let mut config = RagConfig::default();
        config.search.max_results = 2;
        assert!(config.validate().is_err());
        config.search.max_results = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let mut config = RagConfig::default();
        config.index.chunk_overlap = config.index.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_top_k() {
        let mut config = RagConfig::default();
        config.retrieval.top_k = 1;
        assert!(config.validate().is_err());
        config.retrieval.top_k = 9;
        assert!(config.validate().is_err());
    }
}

use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::config::IndexConfig;
use crate::core::errors::PipelineError;
use crate::extract::ExtractedDocument;
use crate::llm::LlmProvider;

use super::splitter::TextSplitter;
use super::Chunk;

/// Builds a fresh `VectorIndex` for each query's documents.
pub struct IndexEngine {
    splitter: TextSplitter,
    llm: Arc<dyn LlmProvider>,
}

impl IndexEngine {
    pub fn new(config: &IndexConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            splitter: TextSplitter::new(config),
            llm,
        }
    }

    /// Chunk and embed all documents into an in-memory index.
    ///
    /// Returns `Ok(None)` when there is nothing to index (short-circuit,
    /// not an error). Embedding failures are index build failures.
    pub async fn build_index(
        &self,
        documents: &[ExtractedDocument],
    ) -> Result<Option<VectorIndex>, PipelineError> {
        if documents.is_empty() {
            return Ok(None);
        }

        let mut chunks = Vec::new();
        for document in documents {
            for text in self.splitter.split(&document.text) {
                chunks.push(Chunk {
                    text,
                    source: document.source_url.clone(),
                });
            }
        }
        if chunks.is_empty() {
            return Ok(None);
        }

        let inputs: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self
            .llm
            .embed(&inputs)
            .await
            .map_err(|e| PipelineError::IndexBuildFailure(e.to_string()))?;

        if embeddings.len() != chunks.len() {
            return Err(PipelineError::IndexBuildFailure(format!(
                "embedding count mismatch: {} chunks, {} vectors",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        Ok(Some(VectorIndex {
            entries,
            llm: self.llm.clone(),
        }))
    }
}

struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Ephemeral in-memory similarity index over one query's chunks.
///
/// Holds the same provider handle it was built with, so query embeddings
/// always live in the same space as the indexed vectors.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    llm: Arc<dyn LlmProvider>,
}

impl VectorIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the `k` chunks nearest the query by cosine similarity,
    /// highest first. Ties keep insertion order (the sort is stable).
    /// An empty index yields an empty result, never an error.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Chunk>, PipelineError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embeddings = self.llm.embed(&[query.to_string()]).await?;
        let query_embedding = query_embeddings
            .first()
            .ok_or_else(|| PipelineError::Internal("query embedding missing".to_string()))?;

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, cosine_similarity(query_embedding, &entry.embedding)))
            .collect();

        scored.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, _)| self.entries[idx].chunk.clone())
            .collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

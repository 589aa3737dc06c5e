use async_trait::async_trait;

use super::types::GenerationRequest;
use crate::core::errors::PipelineError;

/// Boundary to the external text-generation and embedding services.
///
/// The pipeline embeds queries and chunks through the same provider handle,
/// so embedding-space consistency is structural rather than a convention
/// callers have to remember.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g. "gemini") for logging.
    fn name(&self) -> &str;

    /// One non-streaming generation call. Provider failures surface as
    /// `PipelineError::Generation`.
    async fn generate(&self, request: GenerationRequest) -> Result<String, PipelineError>;

    /// Embed a batch of texts into fixed-dimension vectors, one per input,
    /// in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, PipelineError>;
}

use thiserror::Error;

/// Error taxonomy for the retrieval pipeline.
///
/// The first four variants are expected, checked outcomes of an inherently
/// unreliable pipeline (dead links, paywalls, engine rate limits). The
/// orchestrator recovers them locally and reports them in-band as fixed
/// explanatory messages. `Generation` is the one condition that propagates
/// to the caller, since no meaningful answer can be produced without the
/// generation service.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),
    #[error("no extractable content: {0}")]
    NoExtractableContent(String),
    #[error("index build failure: {0}")]
    IndexBuildFailure(String),
    #[error("no relevant content: {0}")]
    NoRelevantContent(String),
    #[error("generation failure: {0}")]
    Generation(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        PipelineError::Internal(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        PipelineError::Generation(err.to_string())
    }

    /// Whether this is one of the four stage failures the orchestrator
    /// converts into a user-facing message instead of raising.
    pub fn is_recoverable_stage_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::SearchUnavailable(_)
                | PipelineError::NoExtractableContent(_)
                | PipelineError::IndexBuildFailure(_)
                | PipelineError::NoRelevantContent(_)
        )
    }
}

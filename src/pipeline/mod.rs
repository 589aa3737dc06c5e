//! Pipeline orchestrator.
//!
//! Sequences search → extract → index → retrieve → synthesize for each
//! query, short-circuiting to a fixed user-facing message whenever a stage
//! comes back empty. The caller-visible contract is uniform: `answer`
//! always yields text; only a failure of the generation service itself is a
//! real error.
//!
//! There is no end-to-end deadline: a slow fetch is bounded only by its own
//! timeout. Callers that need one should wrap `answer` in `tokio::time::timeout`.

pub mod prompt;

use std::sync::Arc;

use serde::Serialize;

use crate::core::config::RagConfig;
use crate::core::errors::PipelineError;
use crate::extract::{Extractor, HttpFetcher, PageFetcher, ProgressFn};
use crate::index::{Chunk, IndexEngine};
use crate::llm::{GenerationRequest, LlmProvider};
use crate::memory::{ConversationMemory, ConversationTurn, Role};
use crate::search::{SearchClient, SearchProvider};
use crate::session::SessionStore;

use prompt::PromptBuilder;

/// Terminal message when search yields no URLs.
pub const SEARCH_FAILED_MESSAGE: &str = "Unable to find relevant information from web search.";
/// Terminal message when every page fails to extract.
pub const EXTRACT_FAILED_MESSAGE: &str = "Failed to extract content from the search results.";
/// Terminal message when no index could be built.
pub const INDEX_FAILED_MESSAGE: &str = "Failed to analyze the content.";
/// Terminal message when retrieval comes back empty.
pub const RETRIEVE_FAILED_MESSAGE: &str =
    "No relevant information found in the processed content.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Searching,
    Extracting,
    Indexing,
    Retrieving,
    Synthesizing,
}

/// Progress events for an optional front end. The core never renders them.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageStarted { stage: Stage },
    StageFinished { stage: Stage, detail: String },
    ExtractionProgress { completed: usize, total: usize },
    Sources { urls: Vec<String> },
}

pub type EventFn = Arc<dyn Fn(PipelineEvent) + Send + Sync>;

pub struct PipelineOrchestrator {
    config: RagConfig,
    search: SearchClient,
    extractor: Extractor,
    index: IndexEngine,
    llm: Arc<dyn LlmProvider>,
    prompt: PromptBuilder,
    events: Option<EventFn>,
}

impl PipelineOrchestrator {
    /// Wire the default HTTP-backed page fetcher.
    pub fn new(
        config: RagConfig,
        search_provider: Arc<dyn SearchProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.extract));
        Self::with_fetcher(config, search_provider, fetcher, llm)
    }

    /// Full seam injection (tests, alternative transports).
    pub fn with_fetcher(
        config: RagConfig,
        search_provider: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            search: SearchClient::new(search_provider),
            extractor: Extractor::new(fetcher, config.extract.concurrency),
            index: IndexEngine::new(&config.index, llm.clone()),
            prompt: PromptBuilder::new(config.prompt.clone()),
            llm,
            events: None,
            config,
        }
    }

    /// Install an event callback for stage progress.
    pub fn with_events(mut self, events: EventFn) -> Self {
        self.events = Some(events);
        self
    }

    /// Run one full pipeline pass grounded by `memory`, then record the
    /// exchange in it.
    ///
    /// The four retrieval-stage failures come back in-band as fixed
    /// explanatory messages. Only `PipelineError::Generation` propagates.
    pub async fn answer(
        &self,
        query: &str,
        memory: &mut ConversationMemory,
    ) -> Result<String, PipelineError> {
        let conversation_context = memory.context();

        let answer = match self.run_retrieval(query).await {
            Ok(chunks) => {
                self.emit(PipelineEvent::StageStarted {
                    stage: Stage::Synthesizing,
                });
                let prompt = self.prompt.build(query, &chunks, &conversation_context);
                let text = self.llm.generate(GenerationRequest::new(prompt)).await?;
                self.emit(PipelineEvent::StageFinished {
                    stage: Stage::Synthesizing,
                    detail: "response ready".to_string(),
                });
                text
            }
            Err(failure) => {
                tracing::info!("Pipeline short-circuited: {}", failure);
                failure_message(&failure).to_string()
            }
        };

        memory.add_user_message(query);
        memory.add_ai_message(&answer);
        if memory.needs_compaction() {
            if let Err(err) = memory.compact(self.llm.as_ref()).await {
                tracing::warn!("Memory compaction failed: {}", err);
            }
        }

        Ok(answer)
    }

    /// Convenience: run `answer` against the store's current session and
    /// append the exchange to its message list.
    pub async fn answer_current(
        &self,
        query: &str,
        store: &mut SessionStore,
    ) -> Result<String, PipelineError> {
        let session = store.current_mut()?;
        let answer = self.answer(query, &mut session.memory).await?;

        session.messages.push(ConversationTurn {
            role: Role::User,
            content: query.to_string(),
        });
        session.messages.push(ConversationTurn {
            role: Role::Assistant,
            content: answer.clone(),
        });

        Ok(answer)
    }

    /// Search → extract → index → retrieve, with a short-circuit at every
    /// empty stage. Later stages never run after an earlier one fails.
    async fn run_retrieval(&self, query: &str) -> Result<Vec<Chunk>, PipelineError> {
        self.emit(PipelineEvent::StageStarted {
            stage: Stage::Searching,
        });
        let results = self
            .search
            .search(query, self.config.search.max_results)
            .await;
        if results.is_empty() {
            return Err(PipelineError::SearchUnavailable(
                "search returned no URLs".to_string(),
            ));
        }
        self.emit(PipelineEvent::StageFinished {
            stage: Stage::Searching,
            detail: format!("found {} pages", results.len()),
        });

        self.emit(PipelineEvent::StageStarted {
            stage: Stage::Extracting,
        });
        let urls: Vec<String> = results.into_iter().map(|r| r.url).collect();
        let progress = self.events.clone().map(|sink| -> ProgressFn {
            Arc::new(move |completed, total| {
                sink(PipelineEvent::ExtractionProgress { completed, total })
            })
        });
        let (documents, succeeded_urls) = self.extractor.extract_all(&urls, progress).await;
        if documents.is_empty() {
            return Err(PipelineError::NoExtractableContent(
                "every page failed to extract".to_string(),
            ));
        }
        self.emit(PipelineEvent::Sources {
            urls: succeeded_urls,
        });
        self.emit(PipelineEvent::StageFinished {
            stage: Stage::Extracting,
            detail: format!("processed {} pages", documents.len()),
        });

        self.emit(PipelineEvent::StageStarted {
            stage: Stage::Indexing,
        });
        let index = match self.index.build_index(&documents).await {
            Ok(Some(index)) => index,
            Ok(None) => {
                return Err(PipelineError::IndexBuildFailure(
                    "no chunks produced".to_string(),
                ))
            }
            Err(err) => return Err(PipelineError::IndexBuildFailure(err.to_string())),
        };
        self.emit(PipelineEvent::StageFinished {
            stage: Stage::Indexing,
            detail: format!("indexed {} chunks", index.len()),
        });

        self.emit(PipelineEvent::StageStarted {
            stage: Stage::Retrieving,
        });
        let chunks = match index.retrieve(query, self.config.retrieval.top_k).await {
            Ok(chunks) => chunks,
            Err(err) => return Err(PipelineError::NoRelevantContent(err.to_string())),
        };
        if chunks.is_empty() {
            return Err(PipelineError::NoRelevantContent(
                "no chunks ranked".to_string(),
            ));
        }
        self.emit(PipelineEvent::StageFinished {
            stage: Stage::Retrieving,
            detail: format!("selected {} chunks", chunks.len()),
        });

        Ok(chunks)
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(sink) = &self.events {
            sink(event);
        }
    }
}

/// Map a recovered stage failure to its fixed user-facing message.
fn failure_message(error: &PipelineError) -> &'static str {
    match error {
        PipelineError::SearchUnavailable(_) => SEARCH_FAILED_MESSAGE,
        PipelineError::NoExtractableContent(_) => EXTRACT_FAILED_MESSAGE,
        PipelineError::IndexBuildFailure(_) => INDEX_FAILED_MESSAGE,
        _ => RETRIEVE_FAILED_MESSAGE,
    }
}

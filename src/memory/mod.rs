//! Conversation memory with a rolling summary.
//!
//! Turns accumulate append-only. Below the token limit, `context()` is the
//! verbatim transcript. Once the limit is exceeded, older turns are folded
//! into a model-generated running summary and only the most recent turns
//! stay verbatim. Evicted content survives only in summarized form; the
//! compression is lossy and that trade-off is accepted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::config::MemoryConfig;
use crate::core::errors::PipelineError;
use crate::llm::{GenerationRequest, LlmProvider};

const SUMMARY_MAX_TOKENS: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    turns: Vec<ConversationTurn>,
    summary: Option<String>,
    config: MemoryConfig,
}

impl ConversationMemory {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            turns: Vec::new(),
            summary: None,
            config,
        }
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn add_ai_message(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Formatted context for grounding the next answer: the running summary
    /// (when one exists) followed by the verbatim turns, oldest first.
    ///
    /// Pure: calling this twice without an intervening mutation returns
    /// identical output.
    pub fn context(&self) -> String {
        let mut out = String::new();
        if let Some(summary) = &self.summary {
            out.push_str("Summary of the earlier conversation:\n");
            out.push_str(summary);
            out.push_str("\n\n");
        }
        for turn in &self.turns {
            out.push_str(&format!("{}: {}\n\n", turn.role, turn.content));
        }
        out
    }

    /// Whether the verbatim turns have outgrown the token budget.
    pub fn needs_compaction(&self) -> bool {
        self.turn_tokens() > self.config.token_limit
            && self.turns.len() > self.config.keep_recent_turns
    }

    /// Fold all but the most recent turns into the rolling summary.
    ///
    /// The evicted turns are summarized together with the previous summary,
    /// so the summary chains across compactions. Turns are only dropped
    /// after the summarization call succeeds.
    pub async fn compact(&mut self, llm: &dyn LlmProvider) -> Result<(), PipelineError> {
        if !self.needs_compaction() {
            return Ok(());
        }

        let keep = self.config.keep_recent_turns.min(self.turns.len());
        let split = self.turns.len() - keep;

        let mut transcript = String::new();
        if let Some(previous) = &self.summary {
            transcript.push_str("Summary so far:\n");
            transcript.push_str(previous);
            transcript.push_str("\n\n");
        }
        for turn in &self.turns[..split] {
            transcript.push_str(&format!("{}: {}\n\n", turn.role, turn.content));
        }

        let prompt = format!(
            "Condense the following conversation into a short running summary. \
             Keep the facts, decisions and open questions; drop pleasantries. \
             Answer with the summary only.\n\n{transcript}"
        );

        let summary = llm
            .generate(GenerationRequest::new(prompt).with_max_tokens(SUMMARY_MAX_TOKENS))
            .await?;

        self.summary = Some(summary.trim().to_string());
        self.turns.drain(..split);

        tracing::debug!("Compacted {} turns into the running summary", split);
        Ok(())
    }

    fn turn_tokens(&self) -> usize {
        self.turns.iter().map(|t| estimate_tokens(&t.content)).sum()
    }
}

/// Rough token estimate, ~4 characters per token.
fn estimate_tokens(text: &str) -> usize {
    (text.len() + 3) / 4
}

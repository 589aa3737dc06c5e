use crate::core::config::PromptConfig;
use crate::index::Chunk;

/// Assembles the single synthesis prompt.
///
/// One builder replaces the competing template variants: conversation
/// context and citation behavior are configuration, not separate code
/// paths.
pub struct PromptBuilder {
    config: PromptConfig,
}

impl PromptBuilder {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, query: &str, chunks: &[Chunk], conversation_context: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(
            "You are a helpful assistant that answers questions based on the latest web \
             search results.\n\
             Use ONLY the web search results below to answer the user's question. If the \
             results do not contain the answer, say so; do not answer from prior \
             knowledge.\n",
        );
        if self.config.suppress_citations {
            prompt.push_str("Do not mention sources or URLs in your answer.\n");
        } else {
            prompt.push_str("Cite the sources you used as [Source: URL].\n");
        }
        prompt.push_str(
            "Never repeat internal identifiers or raw markup from the excerpts in your \
             answer.\n",
        );

        if self.config.include_conversation_context && !conversation_context.trim().is_empty() {
            prompt.push_str("\nConversation so far:\n");
            prompt.push_str(conversation_context.trim());
            prompt.push('\n');
        }

        prompt.push_str("\nWeb search results:\n");
        prompt.push_str(&self.format_chunks(chunks));
        prompt.push_str(&format!("\n\nUser question: {query}\n"));
        prompt
    }

    /// Chunks joined with blank-line separators, in the order given by the
    /// retriever (similarity-ranked).
    fn format_chunks(&self, chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .map(|chunk| {
                if self.config.suppress_citations {
                    chunk.text.clone()
                } else {
                    format!("[Source: {}]\n{}", chunk.source, chunk.text)
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

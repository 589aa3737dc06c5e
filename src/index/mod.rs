//! Per-query chunking and indexing.
//!
//! Splits extracted documents into overlapping windows, embeds them, and
//! loads them into an ephemeral in-memory similarity index. The index lives
//! for exactly one pipeline pass.

pub mod splitter;
pub mod store;

use serde::Serialize;

pub use splitter::TextSplitter;
pub use store::{IndexEngine, VectorIndex};

/// The unit indexed for retrieval. Carries its source URL so citations in
/// the synthesis prompt stay real after splitting.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
}

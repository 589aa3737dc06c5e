//! Real-time web retrieval-augmented generation.
//!
//! Answers a natural-language question by searching the live web,
//! extracting readable text from the top results, indexing that text for
//! semantic lookup, and synthesizing a cited answer with a language model,
//! while carrying bounded conversational memory across turns.
//!
//! The working set is rebuilt from scratch for every query; nothing is
//! persisted across process restarts.

pub mod core;
pub mod extract;
pub mod index;
pub mod llm;
pub mod memory;
pub mod pipeline;
pub mod search;
pub mod session;

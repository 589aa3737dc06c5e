//! Chat sessions and the in-process session store.
//!
//! Sessions live for the lifetime of the process only; nothing is persisted
//! across restarts. The store maintains two invariants: at least one session
//! always exists, and exactly one session is current.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::core::config::MemoryConfig;
use crate::core::errors::PipelineError;
use crate::memory::{ConversationMemory, ConversationTurn};

/// Summary row for session listings.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub message_count: usize,
}

/// One conversation: its display message list plus its memory.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub messages: Vec<ConversationTurn>,
    pub memory: ConversationMemory,
}

/// Owns every session in the process. No ambient globals: callers hold the
/// store and pass it (or the current session's memory) into the pipeline.
pub struct SessionStore {
    sessions: HashMap<String, ChatSession>,
    /// Session ids in creation order; drives deterministic fallback on
    /// deletion and the listing order.
    creation_order: Vec<String>,
    current: String,
    memory_config: MemoryConfig,
}

impl SessionStore {
    /// Create a store with one initial session, which becomes current.
    pub fn new(memory_config: MemoryConfig) -> Self {
        let mut store = Self {
            sessions: HashMap::new(),
            creation_order: Vec::new(),
            current: String::new(),
            memory_config,
        };
        store.current = store.create_session("Chat 1");
        store
    }

    /// Create a new session and return its id. Does not switch to it.
    pub fn create_session(&mut self, title: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        let session = ChatSession {
            id: id.clone(),
            title: title.into(),
            created_at: Utc::now().to_rfc3339(),
            messages: Vec::new(),
            memory: ConversationMemory::new(self.memory_config.clone()),
        };
        self.sessions.insert(id.clone(), session);
        self.creation_order.push(id.clone());
        tracing::info!("Created session {}", id);
        id
    }

    pub fn switch(&mut self, id: &str) -> Result<(), PipelineError> {
        if !self.sessions.contains_key(id) {
            return Err(PipelineError::NotFound(format!("session {id}")));
        }
        self.current = id.to_string();
        Ok(())
    }

    /// Delete a session. The last remaining session cannot be deleted. When
    /// the current session is deleted, the first remaining session by
    /// creation order becomes current.
    pub fn delete(&mut self, id: &str) -> Result<(), PipelineError> {
        if !self.sessions.contains_key(id) {
            return Err(PipelineError::NotFound(format!("session {id}")));
        }
        if self.sessions.len() == 1 {
            return Err(PipelineError::InvalidOperation(
                "cannot delete the last remaining session".to_string(),
            ));
        }

        self.sessions.remove(id);
        self.creation_order.retain(|existing| existing != id);

        if self.current == id {
            if let Some(next) = self.creation_order.first() {
                self.current = next.clone();
            }
        }
        Ok(())
    }

    /// All sessions in creation order.
    pub fn list_sessions(&self) -> Vec<SessionInfo> {
        self.creation_order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .map(|session| SessionInfo {
                id: session.id.clone(),
                title: session.title.clone(),
                created_at: session.created_at.clone(),
                message_count: session.messages.len(),
            })
            .collect()
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> Result<&ChatSession, PipelineError> {
        self.sessions
            .get(&self.current)
            .ok_or_else(|| PipelineError::NotFound(format!("session {}", self.current)))
    }

    pub fn current_mut(&mut self) -> Result<&mut ChatSession, PipelineError> {
        self.sessions
            .get_mut(&self.current)
            .ok_or_else(|| PipelineError::NotFound(format!("session {}", self.current)))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(MemoryConfig::default())
    }

    #[test]
    fn starts_with_one_current_session() {
        let store = store();
        assert_eq!(store.len(), 1);
        assert!(store.current().is_ok());
    }

    #[test]
    fn deleting_the_last_session_is_rejected() {
        let mut store = store();
        let only = store.current_id().to_string();
        assert!(matches!(
            store.delete(&only),
            Err(PipelineError::InvalidOperation(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn deleting_the_current_session_falls_back_by_creation_order() {
        let mut store = store();
        let first = store.current_id().to_string();
        let second = store.create_session("Chat 2");
        let third = store.create_session("Chat 3");

        store.switch(&third).unwrap();
        store.delete(&third).unwrap();

        // Oldest remaining session becomes current.
        assert_eq!(store.current_id(), first);

        store.delete(&first).unwrap();
        assert_eq!(store.current_id(), second);
    }

    #[test]
    fn deleting_a_non_current_session_keeps_the_current_one() {
        let mut store = store();
        let first = store.current_id().to_string();
        let second = store.create_session("Chat 2");

        store.delete(&second).unwrap();
        assert_eq!(store.current_id(), first);
    }

    #[test]
    fn switch_to_unknown_session_fails() {
        let mut store = store();
        assert!(matches!(
            store.switch("no-such-id"),
            Err(PipelineError::NotFound(_))
        ));
    }

    #[test]
    fn listing_follows_creation_order() {
        let mut store = store();
        let second = store.create_session("Chat 2");
        let third = store.create_session("Chat 3");

        let listed: Vec<String> = store.list_sessions().into_iter().map(|s| s.id).collect();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[1], second);
        assert_eq!(listed[2], third);
    }
}

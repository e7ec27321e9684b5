//! In-memory backend — useful for testing and ephemeral sessions.

use agora_core::error::MemoryError;
use agora_core::memory::{Memory, MemoryQuery, SessionContext};
use agora_core::message::{Message, SessionId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory backend that keeps each session's history in a Vec.
/// Useful for testing and sessions where persistence isn't needed.
#[derive(Clone)]
pub struct InMemoryMemory {
    sessions: Arc<RwLock<HashMap<SessionId, Vec<Message>>>>,
}

impl InMemoryMemory {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of sessions with stored history.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Default each message's source to the session's agent.
pub(crate) fn attribute(
    messages: Vec<Message>,
    session: &SessionContext,
) -> impl Iterator<Item = Message> + '_ {
    messages.into_iter().map(|mut m| {
        if m.source.is_none() {
            m.source = session.agent_id.clone();
        }
        m
    })
}

/// The newest `query.limit` matching messages, oldest first.
pub(crate) fn select(history: &[Message], query: &MemoryQuery) -> Vec<Message> {
    let matching: Vec<&Message> = history
        .iter()
        .filter(|m| match &query.agent_id {
            Some(agent) => m.source.as_deref() == Some(agent.as_str()),
            None => true,
        })
        .filter(|m| query.role.is_none_or(|role| m.role == role))
        .collect();

    let skip = matching.len().saturating_sub(query.limit);
    matching.into_iter().skip(skip).cloned().collect()
}

impl Default for InMemoryMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Memory for InMemoryMemory {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn add(
        &self,
        messages: Vec<Message>,
        session: &SessionContext,
    ) -> Result<(), MemoryError> {
        if messages.is_empty() {
            return Ok(());
        }

        let count = messages.len();
        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(session.session_id.clone()).or_default();
        history.extend(attribute(messages, session));

        tracing::debug!(
            session = %session.session_id,
            added = count,
            total = history.len(),
            "Memory updated"
        );
        Ok(())
    }

    async fn get(&self, query: &MemoryQuery) -> Result<Vec<Message>, MemoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&query.session_id)
            .map(|history| select(history, query))
            .unwrap_or_default())
    }

    async fn clear(&self, session_id: &SessionId) -> Result<bool, MemoryError> {
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }
}

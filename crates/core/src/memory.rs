//! Memory trait — append-only conversation history keyed by session.
//!
//! Work patterns never touch memory themselves; the team runners record
//! what each member contributed so later turns can recall it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;
use crate::message::{Message, MessageRole, SessionId};

/// Identifies where a batch of messages belongs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: SessionId,

    /// The agent (or team) recording the messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl SessionContext {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            agent_id: None,
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }
}

/// A history query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryQuery {
    pub session_id: SessionId,

    /// Only messages produced by this agent.
    #[serde(default)]
    pub agent_id: Option<String>,

    /// Only messages of this kind.
    #[serde(default)]
    pub role: Option<MessageRole>,

    /// Return at most the newest `limit` messages.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

impl MemoryQuery {
    pub fn session(session_id: SessionId) -> Self {
        Self {
            session_id,
            agent_id: None,
            role: None,
            limit: default_limit(),
        }
    }

    pub fn agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn role(mut self, role: MessageRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// The core Memory trait.
///
/// Implementations: in-memory, none (no-op).
#[async_trait]
pub trait Memory: Send + Sync {
    /// The backend name (e.g., "in_memory", "none").
    fn name(&self) -> &str;

    /// Append messages to a session's history.
    async fn add(
        &self,
        messages: Vec<Message>,
        session: &SessionContext,
    ) -> std::result::Result<(), MemoryError>;

    /// Read a session's history, oldest first.
    async fn get(&self, query: &MemoryQuery) -> std::result::Result<Vec<Message>, MemoryError>;

    /// Drop a session's history. Returns whether anything was removed.
    async fn clear(&self, session_id: &SessionId) -> std::result::Result<bool, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_query_defaults() {
        let query = MemoryQuery::session(SessionId::from("s1"));
        assert_eq!(query.limit, 50);
        assert!(query.agent_id.is_none());
        assert!(query.role.is_none());
    }

    #[test]
    fn memory_query_builder() {
        let query = MemoryQuery::session(SessionId::from("s1"))
            .agent("critic")
            .role(MessageRole::Assistant)
            .limit(3);
        assert_eq!(query.agent_id.as_deref(), Some("critic"));
        assert_eq!(query.role, Some(MessageRole::Assistant));
        assert_eq!(query.limit, 3);
    }

    #[test]
    fn memory_query_deserializes_with_defaults() {
        let json = r#"{"session_id": "s9"}"#;
        let query: MemoryQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.session_id, SessionId::from("s9"));
        assert_eq!(query.limit, 50);
    }
}

//! No-op memory backend — disables session memory entirely.

use agora_core::error::MemoryError;
use agora_core::memory::{Memory, MemoryQuery, SessionContext};
use agora_core::message::{Message, SessionId};
use async_trait::async_trait;

/// A no-op memory backend that stores nothing.
pub struct NoopMemory;

#[async_trait]
impl Memory for NoopMemory {
    fn name(&self) -> &str {
        "none"
    }

    async fn add(
        &self,
        _messages: Vec<Message>,
        _session: &SessionContext,
    ) -> Result<(), MemoryError> {
        Ok(())
    }

    async fn get(&self, _query: &MemoryQuery) -> Result<Vec<Message>, MemoryError> {
        Ok(Vec::new())
    }

    async fn clear(&self, _session_id: &SessionId) -> Result<bool, MemoryError> {
        Ok(false)
    }
}

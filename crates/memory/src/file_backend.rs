//! File-based memory backend — persistent JSON-lines storage.
//!
//! Each line is one stored message tagged with its session. The file is
//! read once on creation; `add` appends lines and `clear` rewrites the file
//! without the cleared session, so history survives across `agora` runs.
//!
//! Storage location: `~/.agora/memory/sessions.jsonl`

use agora_core::error::MemoryError;
use agora_core::memory::{Memory, MemoryQuery, SessionContext};
use agora_core::message::{Message, SessionId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::in_memory::{attribute, select};

/// One line of the JSONL file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredMessage {
    session_id: SessionId,
    message: Message,
}

/// A file-backed session store using JSONL (one message per line).
///
/// Sessions are held in memory for reads; every mutation is written through
/// to disk before it returns.
pub struct FileMemory {
    path: PathBuf,
    sessions: Arc<RwLock<HashMap<SessionId, Vec<Message>>>>,
}

impl FileMemory {
    /// Open the store at `path`. A missing file starts empty and is created
    /// on the first write.
    pub fn new(path: PathBuf) -> Self {
        let sessions = Self::load_from_disk(&path);
        debug!(path = %path.display(), sessions = sessions.len(), "File memory backend loaded");
        Self {
            path,
            sessions: Arc::new(RwLock::new(sessions)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> HashMap<SessionId, Vec<Message>> {
        let mut sessions: HashMap<SessionId, Vec<Message>> = HashMap::new();
        let Ok(content) = std::fs::read_to_string(path) else {
            return sessions;
        };

        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<StoredMessage>(line) {
                Ok(stored) => sessions
                    .entry(stored.session_id)
                    .or_default()
                    .push(stored.message),
                Err(e) => warn!(error = %e, "Skipping corrupted memory line"),
            }
        }
        sessions
    }

    fn ensure_parent(&self) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create memory directory: {e}"))
            })?;
        }
        Ok(())
    }

    fn encode(session_id: &SessionId, message: &Message) -> Result<String, MemoryError> {
        let stored = StoredMessage {
            session_id: session_id.clone(),
            message: message.clone(),
        };
        let mut line = serde_json::to_string(&stored)
            .map_err(|e| MemoryError::Storage(format!("Failed to serialize message: {e}")))?;
        line.push('\n');
        Ok(line)
    }

    fn append(&self, session_id: &SessionId, messages: &[Message]) -> Result<(), MemoryError> {
        self.ensure_parent()?;
        let mut content = String::new();
        for message in messages {
            content.push_str(&Self::encode(session_id, message)?);
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MemoryError::Storage(format!("Failed to open memory file: {e}")))?;
        file.write_all(content.as_bytes())
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))
    }

    fn rewrite(&self, sessions: &HashMap<SessionId, Vec<Message>>) -> Result<(), MemoryError> {
        self.ensure_parent()?;
        let mut content = String::new();
        for (session_id, history) in sessions {
            for message in history {
                content.push_str(&Self::encode(session_id, message)?);
            }
        }
        std::fs::write(&self.path, content)
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))
    }
}

#[async_trait]
impl Memory for FileMemory {
    fn name(&self) -> &str {
        "file"
    }

    async fn add(
        &self,
        messages: Vec<Message>,
        session: &SessionContext,
    ) -> Result<(), MemoryError> {
        if messages.is_empty() {
            return Ok(());
        }

        let messages: Vec<Message> = attribute(messages, session).collect();
        let mut sessions = self.sessions.write().await;
        self.append(&session.session_id, &messages)?;

        let history = sessions.entry(session.session_id.clone()).or_default();
        history.extend(messages);
        debug!(
            session = %session.session_id,
            total = history.len(),
            path = %self.path.display(),
            "Memory persisted"
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
        let mut sessions = self.sessions.write().await;
        if sessions.remove(session_id).is_none() {
            return Ok(false);
        }
        self.rewrite(&sessions)?;
        Ok(true)
    }
}

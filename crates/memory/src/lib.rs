//! Memory implementations for Agora.

pub mod file_backend;
pub mod in_memory;
pub mod noop;

use std::path::Path;
use std::sync::Arc;

use agora_core::Memory;

pub use file_backend::FileMemory;
pub use in_memory::InMemoryMemory;
pub use noop::NoopMemory;

/// Build the memory backend named in configuration.
///
/// `file_path` is only used by the `file` backend. Unknown names fall back
/// to the no-op backend; configuration validation rejects them before this
/// is reached.
pub fn from_backend(name: &str, file_path: &Path) -> Arc<dyn Memory> {
    match name {
        "file" => Arc::new(FileMemory::new(file_path.to_path_buf())),
        "in_memory" => Arc::new(InMemoryMemory::new()),
        other => {
            if other != "none" {
                tracing::warn!(backend = other, "Unknown memory backend, memory disabled");
            }
            Arc::new(NoopMemory)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        assert_eq!(from_backend("file", &path).name(), "file");
        assert_eq!(from_backend("in_memory", &path).name(), "in_memory");
        assert_eq!(from_backend("none", &path).name(), "none");
        assert_eq!(from_backend("redis", &path).name(), "none");
    }
}

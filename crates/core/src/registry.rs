//! Agent registry — name → agent handle resolution.
//!
//! Work-pattern templates name their members; the registry is where those
//! names are looked up before the pattern is bound.

use std::collections::HashMap;

use crate::agent::AgentHandle;

/// Resolves agent names to configured instances.
pub trait AgentRegistry: Send + Sync {
    /// Look up an agent by name. Missing agents yield `None`.
    fn resolve(&self, name: &str) -> Option<AgentHandle>;

    /// All registered agent names, sorted.
    fn names(&self) -> Vec<String>;
}

/// A registry held entirely in memory.
#[derive(Debug)]
pub struct InMemoryRegistry {
    agents: HashMap<String, AgentHandle>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register an agent. Replaces any existing agent with the same name.
    pub fn register(&mut self, agent: AgentHandle) {
        let name = agent.name().to_string();
        self.agents.insert(name, agent);
    }

    /// Get an agent by name.
    pub fn get(&self, name: &str) -> Option<&AgentHandle> {
        self.agents.get(name)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry for InMemoryRegistry {
    fn resolve(&self, name: &str) -> Option<AgentHandle> {
        self.agents.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }
}

//! Scripted agents: members that replay configured outputs.
//!
//! Used by the CLI to dry-run teams declared in `[[agents]]` without any
//! model behind them, and by tests. Each call returns the next configured
//! response; once the script runs out the last response repeats. An empty
//! script yields the role's default output.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use agora_config::AgentConfig;
use agora_core::error::MemberError;
use agora_core::{
    AgentHandle, CritiqueAgent, CritiqueOutput, DebateInput, Error, ExecutingAgent,
    ExecutionOutput, InMemoryRegistry, PipelineContext, PlanningAgent, PlanningOutput, RagAgent,
    Result, ReviewingAgent, RewritingAgent, Role, StageOutput,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A member that answers from a fixed script.
pub struct ScriptedAgent {
    name: String,
    responses: Vec<Value>,
    cursor: AtomicUsize,
}

impl ScriptedAgent {
    pub fn new(name: impl Into<String>, responses: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            responses,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many times the agent has been called.
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Wrap the agent in a handle exposing the given role.
    pub fn into_handle(self, role: Role, description: impl Into<String>) -> AgentHandle {
        let name = self.name.clone();
        let agent = Arc::new(self);
        let handle = match role {
            Role::Planning => AgentHandle::planning(name, agent),
            Role::Critique => AgentHandle::critique(name, agent),
            Role::Executing => AgentHandle::executing(name, agent),
            Role::Rag => AgentHandle::rag(name, agent),
            Role::Reviewing => AgentHandle::reviewing(name, agent),
            Role::Rewriting => AgentHandle::rewriting(name, agent),
        };
        handle.with_description(description)
    }

    fn next_value(&self) -> Value {
        let call = self.cursor.fetch_add(1, Ordering::SeqCst);
        match self.responses.len() {
            0 => Value::Object(serde_json::Map::new()),
            len => self.responses[call.min(len - 1)].clone(),
        }
    }

    fn next<T: DeserializeOwned>(&self) -> std::result::Result<T, MemberError> {
        serde_json::from_value(self.next_value()).map_err(|e| MemberError::InvalidOutput {
            agent: self.name.clone(),
            reason: e.to_string(),
        })
    }

    /// Stage outputs may be scripted as bare strings.
    fn next_stage(&self) -> std::result::Result<StageOutput, MemberError> {
        match self.next_value() {
            Value::String(text) => Ok(StageOutput::text(text)),
            value => serde_json::from_value(value).map_err(|e| MemberError::InvalidOutput {
                agent: self.name.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl PlanningAgent for ScriptedAgent {
    async fn plan(&self, _input: &DebateInput) -> std::result::Result<PlanningOutput, MemberError> {
        self.next()
    }
}

#[async_trait]
impl CritiqueAgent for ScriptedAgent {
    async fn critique(
        &self,
        _input: &DebateInput,
    ) -> std::result::Result<CritiqueOutput, MemberError> {
        self.next()
    }
}

#[async_trait]
impl ExecutingAgent for ScriptedAgent {
    async fn execute(
        &self,
        _input: &DebateInput,
        _plan: &PlanningOutput,
    ) -> std::result::Result<ExecutionOutput, MemberError> {
        self.next()
    }
}

#[async_trait]
impl RagAgent for ScriptedAgent {
    async fn retrieve(
        &self,
        _context: &PipelineContext,
    ) -> std::result::Result<StageOutput, MemberError> {
        self.next_stage()
    }
}

#[async_trait]
impl ReviewingAgent for ScriptedAgent {
    async fn review(
        &self,
        _context: &PipelineContext,
    ) -> std::result::Result<StageOutput, MemberError> {
        self.next_stage()
    }
}

#[async_trait]
impl RewritingAgent for ScriptedAgent {
    async fn rewrite(
        &self,
        _context: &PipelineContext,
    ) -> std::result::Result<StageOutput, MemberError> {
        self.next_stage()
    }
}

/// Build a registry from `[[agents]]` declarations.
pub fn build_registry(agents: &[AgentConfig]) -> Result<InMemoryRegistry> {
    let mut registry = InMemoryRegistry::new();
    for config in agents {
        let role = config.role().map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        let agent = ScriptedAgent::new(&config.name, config.responses.clone());
        registry.register(agent.into_handle(role, &config.description));
    }
    tracing::debug!(agents = registry.len(), "Agent registry built");
    Ok(registry)
}

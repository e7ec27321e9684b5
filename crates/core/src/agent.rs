//! Agent roles, role contracts, and agent handles.
//!
//! A work pattern never talks to "an agent" in general. It talks to a
//! member bound to a specific slot (planning, critique, rag, ...), and each
//! slot has its own trait. An [`AgentHandle`] wraps exactly one of those
//! capabilities, so binding a handle to a slot is a single, explicit check
//! rather than a runtime type inspection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::{DebateInput, PipelineContext};
use crate::error::{BindingError, MemberError};

/// The slot a member agent fills inside a work pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Planning,
    Critique,
    Executing,
    Rag,
    Reviewing,
    Rewriting,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Planning,
        Role::Critique,
        Role::Executing,
        Role::Rag,
        Role::Reviewing,
        Role::Rewriting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Critique => "critique",
            Self::Executing => "executing",
            Self::Rag => "rag",
            Self::Reviewing => "reviewing",
            Self::Rewriting => "rewriting",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| BindingError::UnknownRole(s.to_string()))
    }
}

// ── Member outputs ───────────────────────────────────────────────────────

/// Output of a planning member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningOutput {
    /// The proposed task framework, one entry per step.
    #[serde(default)]
    pub framework: Vec<String>,

    /// The planner's reasoning, used as the round summary.
    #[serde(default)]
    pub thought: String,

    /// Any additional fields the planner reports.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PlanningOutput {
    /// Stand-in plan used when no planning member is bound: the framework
    /// is the raw input.
    pub fn from_input(input: &str) -> Self {
        Self {
            framework: vec![input.to_string()],
            ..Self::default()
        }
    }
}

/// Output of a critique member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CritiqueOutput {
    #[serde(default)]
    pub concerns: Vec<String>,

    #[serde(default)]
    pub suggestions: Vec<String>,

    /// Explicit score in [0, 1]. Out-of-range values are clamped by the
    /// debate loop; absent scores are derived from the concern count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critique_score: Option<f64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Output of an executing member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutput {
    #[serde(default)]
    pub executing_result: serde_json::Value,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionOutput {
    pub fn is_empty(&self) -> bool {
        self.executing_result.is_null() && self.extra.is_empty()
    }
}

/// Output of a sequential pipeline stage (rag, reviewing, rewriting).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    /// Main text produced by the stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Retrieved background knowledge (rag).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    /// Review suggestion (reviewing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Review score (reviewing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StageOutput {
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_none()
            && self.background.is_none()
            && self.suggestion.is_none()
            && self.score.is_none()
            && self.extra.is_empty()
    }
}

// ── Role contracts ───────────────────────────────────────────────────────

#[async_trait]
pub trait PlanningAgent: Send + Sync {
    async fn plan(&self, input: &DebateInput) -> Result<PlanningOutput, MemberError>;
}

#[async_trait]
pub trait CritiqueAgent: Send + Sync {
    async fn critique(&self, input: &DebateInput) -> Result<CritiqueOutput, MemberError>;
}

#[async_trait]
pub trait ExecutingAgent: Send + Sync {
    async fn execute(
        &self,
        input: &DebateInput,
        plan: &PlanningOutput,
    ) -> Result<ExecutionOutput, MemberError>;
}

#[async_trait]
pub trait RagAgent: Send + Sync {
    async fn retrieve(&self, context: &PipelineContext) -> Result<StageOutput, MemberError>;
}

#[async_trait]
pub trait ReviewingAgent: Send + Sync {
    async fn review(&self, context: &PipelineContext) -> Result<StageOutput, MemberError>;
}

#[async_trait]
pub trait RewritingAgent: Send + Sync {
    async fn rewrite(&self, context: &PipelineContext) -> Result<StageOutput, MemberError>;
}

// ── Handles ──────────────────────────────────────────────────────────────

/// The single capability an agent handle carries.
#[derive(Clone)]
pub enum Member {
    Planning(Arc<dyn PlanningAgent>),
    Critique(Arc<dyn CritiqueAgent>),
    Executing(Arc<dyn ExecutingAgent>),
    Rag(Arc<dyn RagAgent>),
    Reviewing(Arc<dyn ReviewingAgent>),
    Rewriting(Arc<dyn RewritingAgent>),
}

impl Member {
    pub fn role(&self) -> Role {
        match self {
            Self::Planning(_) => Role::Planning,
            Self::Critique(_) => Role::Critique,
            Self::Executing(_) => Role::Executing,
            Self::Rag(_) => Role::Rag,
            Self::Reviewing(_) => Role::Reviewing,
            Self::Rewriting(_) => Role::Rewriting,
        }
    }
}

/// A named, configured agent instance.
///
/// Handles are cheap to clone; the underlying agent is shared read-only
/// across every pattern instance it is bound into.
#[derive(Clone)]
pub struct AgentHandle {
    name: String,
    description: String,
    member: Member,
}

impl AgentHandle {
    pub fn new(name: impl Into<String>, member: Member) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            member,
        }
    }

    pub fn planning(name: impl Into<String>, agent: Arc<dyn PlanningAgent>) -> Self {
        Self::new(name, Member::Planning(agent))
    }

    pub fn critique(name: impl Into<String>, agent: Arc<dyn CritiqueAgent>) -> Self {
        Self::new(name, Member::Critique(agent))
    }

    pub fn executing(name: impl Into<String>, agent: Arc<dyn ExecutingAgent>) -> Self {
        Self::new(name, Member::Executing(agent))
    }

    pub fn rag(name: impl Into<String>, agent: Arc<dyn RagAgent>) -> Self {
        Self::new(name, Member::Rag(agent))
    }

    pub fn reviewing(name: impl Into<String>, agent: Arc<dyn ReviewingAgent>) -> Self {
        Self::new(name, Member::Reviewing(agent))
    }

    pub fn rewriting(name: impl Into<String>, agent: Arc<dyn RewritingAgent>) -> Self {
        Self::new(name, Member::Rewriting(agent))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn role(&self) -> Role {
        self.member.role()
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    fn mismatch(&self, slot: Role) -> BindingError {
        BindingError::TypeMismatch {
            slot,
            agent: self.name.clone(),
            actual: self.role(),
        }
    }

    pub fn as_planning(&self) -> Result<Arc<dyn PlanningAgent>, BindingError> {
        match &self.member {
            Member::Planning(agent) => Ok(agent.clone()),
            _ => Err(self.mismatch(Role::Planning)),
        }
    }

    pub fn as_critique(&self) -> Result<Arc<dyn CritiqueAgent>, BindingError> {
        match &self.member {
            Member::Critique(agent) => Ok(agent.clone()),
            _ => Err(self.mismatch(Role::Critique)),
        }
    }

    pub fn as_executing(&self) -> Result<Arc<dyn ExecutingAgent>, BindingError> {
        match &self.member {
            Member::Executing(agent) => Ok(agent.clone()),
            _ => Err(self.mismatch(Role::Executing)),
        }
    }

    pub fn as_rag(&self) -> Result<Arc<dyn RagAgent>, BindingError> {
        match &self.member {
            Member::Rag(agent) => Ok(agent.clone()),
            _ => Err(self.mismatch(Role::Rag)),
        }
    }

    pub fn as_reviewing(&self) -> Result<Arc<dyn ReviewingAgent>, BindingError> {
        match &self.member {
            Member::Reviewing(agent) => Ok(agent.clone()),
            _ => Err(self.mismatch(Role::Reviewing)),
        }
    }

    pub fn as_rewriting(&self) -> Result<Arc<dyn RewritingAgent>, BindingError> {
        match &self.member {
            Member::Rewriting(agent) => Ok(agent.clone()),
            _ => Err(self.mismatch(Role::Rewriting)),
        }
    }
}

impl fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentHandle")
            .field("name", &self.name)
            .field("role", &self.role())
            .finish()
    }
}

/// Slot → agent assignments for one work-pattern configuration.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    members: BTreeMap<Role, AgentHandle>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an agent to a slot. Replaces any previous assignment.
    pub fn bind(mut self, slot: Role, agent: AgentHandle) -> Self {
        self.members.insert(slot, agent);
        self
    }

    pub fn insert(&mut self, slot: Role, agent: AgentHandle) {
        self.members.insert(slot, agent);
    }

    pub fn get(&self, slot: Role) -> Option<&AgentHandle> {
        self.members.get(&slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = Role> + '_ {
        self.members.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

//! # Agora Core
//!
//! Domain types, traits, and error definitions for the Agora agent
//! orchestration framework. This crate has **no runtime dependencies**: it
//! defines the domain model that the pattern, memory, and CLI crates
//! implement against.
//!
//! ## Layout
//!
//! - [`agent`]: roles, the per-role agent contracts, and agent handles
//! - [`context`]: what members see when a work pattern invokes them
//! - [`registry`]: name → agent resolution
//! - [`memory`]: session history storage
//! - [`error`]: error types for every bounded context

pub mod agent;
pub mod context;
pub mod error;
pub mod memory;
pub mod message;
pub mod registry;

// Re-export key types at crate root for ergonomics
pub use agent::{
    AgentHandle, Bindings, CritiqueAgent, CritiqueOutput, ExecutingAgent, ExecutionOutput, Member,
    PlanningAgent, PlanningOutput, RagAgent, ReviewingAgent, RewritingAgent, Role, StageOutput,
};
pub use context::{DebateInput, ExpertFramework, PipelineContext, PipelineStage};
pub use error::{BindingError, Error, MemberError, MemoryError, Result};
pub use memory::{Memory, MemoryQuery, SessionContext};
pub use message::{Message, MessageRole, SessionId};
pub use registry::{AgentRegistry, InMemoryRegistry};

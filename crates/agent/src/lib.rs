//! Multi-agent work patterns for Agora.
//!
//! A work pattern drives several role-specific member agents through a
//! fixed protocol:
//!
//! 1. **Bind** members to the pattern's slots (capabilities are checked here)
//! 2. **Invoke** with the user's input; stages run in order over a shared,
//!    per-invocation context
//! 3. **Stream** progress as [`PatternEvent`]s while running
//! 4. **Return** an aggregated result
//!
//! Teams ([`DebateTeam`], [`PipelineTeam`]) add configuration-driven member
//! resolution and session memory on top.

pub mod patterns;
pub mod scripted;
pub mod stream_event;
pub mod team;

pub use patterns::{
    DebatePattern, DebateRequest, DebateResult, DebateSettings, PipelineRequest, PipelineResult,
    Round, SequentialPattern, StageRecord, WorkPattern, consensus_score,
};
pub use scripted::{ScriptedAgent, build_registry};
pub use stream_event::PatternEvent;
pub use team::{DebateTeam, PipelineTeam};

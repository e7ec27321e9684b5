//! Work-pattern streaming events.
//!
//! `PatternEvent` reports progress while a pattern runs, so a caller (the
//! CLI, a log sink) can render rounds and stages as they complete instead
//! of waiting for the final result.

use agora_core::{PipelineStage, StageOutput};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted by work patterns during execution.
///
/// - `round_started` — a debate round is beginning
/// - `planning`      — the planning member produced a plan
/// - `critique`      — the critique member scored the plan
/// - `execution`     — the executing member ran the final plan
/// - `stage`         — a pipeline stage finished
/// - `done`          — the pattern finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternEvent {
    /// A debate round is starting.
    RoundStarted { round: u32, max_rounds: u32 },

    /// Planning result for a round. `agent` is `None` when the plan was
    /// synthesized because no planning member is bound.
    Planning {
        round: u32,
        agent: Option<String>,
        framework: Vec<String>,
        thought: String,
    },

    /// Critique result for a round, with the derived consensus score.
    Critique {
        round: u32,
        agent: Option<String>,
        concerns: Vec<String>,
        suggestions: Vec<String>,
        consensus_score: f64,
    },

    /// The executing member's result.
    Execution {
        agent: String,
        result: serde_json::Value,
    },

    /// A pipeline stage finished.
    Stage {
        stage: PipelineStage,
        agent: Option<String>,
        output: StageOutput,
    },

    /// The pattern is complete.
    Done { pattern: String, summary: String },
}

impl PatternEvent {
    /// Event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RoundStarted { .. } => "round_started",
            Self::Planning { .. } => "planning",
            Self::Critique { .. } => "critique",
            Self::Execution { .. } => "execution",
            Self::Stage { .. } => "stage",
            Self::Done { .. } => "done",
        }
    }
}

/// Send an event if a stream is attached. A dropped receiver is ignored.
pub(crate) async fn emit(stream: Option<&mpsc::Sender<PatternEvent>>, event: PatternEvent) {
    if let Some(tx) = stream {
        if tx.send(event).await.is_err() {
            tracing::trace!("Pattern event receiver dropped");
        }
    }
}

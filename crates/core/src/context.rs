//! Per-invocation shared context threaded between work-pattern stages.
//!
//! Each invocation owns its context exclusively. Stages read what earlier
//! stages wrote; there are no concurrent writers.

use serde::{Deserialize, Serialize};

use crate::agent::{Role, StageOutput};

/// Optional per-role guidance handed to debate members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertFramework {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critique: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executing: Option<String>,
}

impl ExpertFramework {
    pub fn for_role(&self, role: Role) -> Option<&str> {
        match role {
            Role::Planning => self.planning.as_deref(),
            Role::Critique => self.critique.as_deref(),
            Role::Executing => self.executing.as_deref(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.planning.is_none() && self.critique.is_none() && self.executing.is_none()
    }
}

/// What a debate member sees when it is invoked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebateInput {
    /// The original user task.
    pub input: String,

    /// Textual summaries of every stage so far, oldest first.
    #[serde(default)]
    pub history: Vec<String>,

    /// Already-known background for the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    /// Expert guidance for the member's role, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert_guidance: Option<String>,
}

/// The three stages of the sequential pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Rag,
    Reviewing,
    Rewriting,
}

impl PipelineStage {
    pub const ORDER: [PipelineStage; 3] = [
        PipelineStage::Rag,
        PipelineStage::Reviewing,
        PipelineStage::Rewriting,
    ];

    pub fn role(&self) -> Role {
        match self {
            Self::Rag => Role::Rag,
            Self::Reviewing => Role::Reviewing,
            Self::Rewriting => Role::Rewriting,
        }
    }

    /// Key under which the stage's output is reported.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Rag => "rag_result",
            Self::Reviewing => "reviewing_result",
            Self::Rewriting => "rewriting_result",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.role().as_str())
    }
}

/// Shared context for the sequential rag → reviewing → rewriting pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineContext {
    /// The original user input.
    pub input: String,

    /// Background written by the rag stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    /// The rag stage's full output (the draft answer to review).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expressing_result: Option<StageOutput>,

    /// Suggestion written by the reviewing stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Score written by the reviewing stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_score: Option<f64>,

    /// The rewriting stage's output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewriting_result: Option<StageOutput>,
}

impl PipelineContext {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Merge a stage's output into the context under that stage's keys.
    ///
    /// Always overwrites: an empty output from an unbound stage clears the
    /// fields downstream stages would read.
    pub fn absorb(&mut self, stage: PipelineStage, output: &StageOutput) {
        match stage {
            PipelineStage::Rag => {
                self.background = output.background.clone();
                self.expressing_result = Some(output.clone());
            }
            PipelineStage::Reviewing => {
                self.suggestion = output.suggestion.clone();
                self.review_score = output.score;
            }
            PipelineStage::Rewriting => {
                self.rewriting_result = Some(output.clone());
            }
        }
    }

    /// The draft text produced by the rag stage, if any.
    pub fn draft(&self) -> Option<&str> {
        self.expressing_result
            .as_ref()
            .and_then(|r| r.output.as_deref())
    }
}

//! Shared test helpers for pattern tests.

use std::sync::{Arc, Mutex};

use agora_core::error::MemberError;
use agora_core::{
    CritiqueAgent, CritiqueOutput, DebateInput, ExecutingAgent, ExecutionOutput, PipelineContext,
    PlanningAgent, PlanningOutput, RagAgent, ReviewingAgent, RewritingAgent, StageOutput,
};
use async_trait::async_trait;

use crate::scripted::ScriptedAgent;

/// A planner that records every input and answers "plan {n}" on call n.
pub struct RecordingPlanner {
    inputs: Mutex<Vec<DebateInput>>,
}

impl RecordingPlanner {
    pub fn new() -> Self {
        Self {
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    pub fn inputs(&self) -> Vec<DebateInput> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlanningAgent for RecordingPlanner {
    async fn plan(&self, input: &DebateInput) -> Result<PlanningOutput, MemberError> {
        let mut inputs = self.inputs.lock().unwrap();
        inputs.push(input.clone());
        let n = inputs.len();
        Ok(PlanningOutput {
            framework: vec![format!("step {n}")],
            thought: format!("plan {n}"),
            ..Default::default()
        })
    }
}

/// An executor that records the plan it was given.
pub struct RecordingExecutor {
    calls: Mutex<Vec<(DebateInput, PlanningOutput)>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn plans(&self) -> Vec<PlanningOutput> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn inputs(&self) -> Vec<DebateInput> {
        self.calls.lock().unwrap().iter().map(|(i, _)| i.clone()).collect()
    }
}

#[async_trait]
impl ExecutingAgent for RecordingExecutor {
    async fn execute(
        &self,
        input: &DebateInput,
        plan: &PlanningOutput,
    ) -> Result<ExecutionOutput, MemberError> {
        self.calls
            .lock()
            .unwrap()
            .push((input.clone(), plan.clone()));
        Ok(ExecutionOutput {
            executing_result: serde_json::json!(format!("executed {}", plan.thought)),
            ..Default::default()
        })
    }
}

/// A pipeline stage that records the context it saw and returns a fixed output.
pub struct RecordingStage {
    output: StageOutput,
    seen: Mutex<Vec<PipelineContext>>,
}

impl RecordingStage {
    pub fn new(output: StageOutput) -> Self {
        Self {
            output,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<PipelineContext> {
        self.seen.lock().unwrap().clone()
    }

    fn record(&self, context: &PipelineContext) -> StageOutput {
        self.seen.lock().unwrap().push(context.clone());
        self.output.clone()
    }
}

#[async_trait]
impl RagAgent for RecordingStage {
    async fn retrieve(&self, context: &PipelineContext) -> Result<StageOutput, MemberError> {
        Ok(self.record(context))
    }
}

#[async_trait]
impl ReviewingAgent for RecordingStage {
    async fn review(&self, context: &PipelineContext) -> Result<StageOutput, MemberError> {
        Ok(self.record(context))
    }
}

#[async_trait]
impl RewritingAgent for RecordingStage {
    async fn rewrite(&self, context: &PipelineContext) -> Result<StageOutput, MemberError> {
        Ok(self.record(context))
    }
}

/// A member that fails in every role.
pub struct FailingAgent;

fn failure() -> MemberError {
    MemberError::ExecutionFailed {
        agent: "failing".into(),
        reason: "simulated failure".into(),
    }
}

#[async_trait]
impl PlanningAgent for FailingAgent {
    async fn plan(&self, _input: &DebateInput) -> Result<PlanningOutput, MemberError> {
        Err(failure())
    }
}

#[async_trait]
impl CritiqueAgent for FailingAgent {
    async fn critique(&self, _input: &DebateInput) -> Result<CritiqueOutput, MemberError> {
        Err(failure())
    }
}

#[async_trait]
impl ReviewingAgent for FailingAgent {
    async fn review(&self, _context: &PipelineContext) -> Result<StageOutput, MemberError> {
        Err(failure())
    }
}

/// A critic that reports the given explicit scores, one per round.
pub fn critic_with_scores(scores: &[f64]) -> Arc<ScriptedAgent> {
    let responses = scores
        .iter()
        .map(|s| serde_json::json!({ "concerns": [], "critique_score": s }))
        .collect();
    Arc::new(ScriptedAgent::new("critic", responses))
}

/// A critic that reports `k` concerns and no score, one count per round.
pub fn critic_with_concerns(counts: &[usize]) -> Arc<ScriptedAgent> {
    let responses = counts
        .iter()
        .map(|k| {
            let concerns: Vec<String> = (0..*k).map(|i| format!("concern {i}")).collect();
            serde_json::json!({ "concerns": concerns, "suggestions": ["be specific"] })
        })
        .collect();
    Arc::new(ScriptedAgent::new("critic", responses))
}

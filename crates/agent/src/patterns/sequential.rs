//! Sequential pipeline pattern: rag → reviewing → rewriting.
//!
//! The rag stage drafts an answer with its background knowledge, the
//! reviewing stage critiques the draft, and the rewriting stage produces
//! the final answer from the draft and the review. Stages run strictly in
//! order; each one sees everything earlier stages wrote to the shared
//! [`PipelineContext`].

use std::sync::Arc;

use agora_core::{
    Bindings, PipelineContext, PipelineStage, RagAgent, Result, ReviewingAgent, RewritingAgent,
    Role, StageOutput,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::patterns::work_pattern::{Slot, WorkPattern, slot_name};
use crate::stream_event::{PatternEvent, emit};

/// Input for one pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineRequest {
    pub input: String,
}

impl PipelineRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// What one stage contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: PipelineStage,
    /// `None` when no agent is bound to the stage.
    pub agent: Option<String>,
    /// Empty for unbound stages.
    pub output: StageOutput,
}

/// Outcome of a pipeline invocation. Always holds one record per stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub stages: Vec<StageRecord>,
    /// The shared context as the last stage left it.
    pub context: PipelineContext,
}

impl PipelineResult {
    pub fn get(&self, stage: PipelineStage) -> Option<&StageOutput> {
        self.stages.iter().find(|r| r.stage == stage).map(|r| &r.output)
    }

    /// The rewriting stage's text, which callers treat as the answer.
    pub fn answer(&self) -> Option<&str> {
        self.get(PipelineStage::Rewriting)
            .and_then(|o| o.output.as_deref())
    }

    /// Stage outputs keyed by `rag_result`, `reviewing_result`, `rewriting_result`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        for record in &self.stages {
            let output = serde_json::to_value(&record.output)?;
            map.insert(record.stage.key().to_string(), output);
        }
        Ok(serde_json::Value::Object(map))
    }

    /// One-line summary for logging.
    pub fn summary_line(&self) -> String {
        let ran: Vec<String> = self
            .stages
            .iter()
            .map(|r| match &r.agent {
                Some(agent) => format!("{}={}", r.stage, agent),
                None => format!("{}=-", r.stage),
            })
            .collect();
        format!(
            "Pipeline: [{}], answer {}",
            ran.join(", "),
            match self.answer() {
                Some(text) => format!("{} chars", text.chars().count()),
                None => "missing".to_string(),
            }
        )
    }
}

/// The sequential rag → reviewing → rewriting work pattern.
#[derive(Debug, Clone)]
pub struct SequentialPattern {
    name: String,
    description: String,
    rag: Option<Slot<dyn RagAgent>>,
    reviewing: Option<Slot<dyn ReviewingAgent>>,
    rewriting: Option<Slot<dyn RewritingAgent>>,
    output_stream: Option<mpsc::Sender<PatternEvent>>,
}

impl SequentialPattern {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            rag: None,
            reviewing: None,
            rewriting: None,
            output_stream: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rag(mut self, name: impl Into<String>, agent: Arc<dyn RagAgent>) -> Self {
        self.rag = Some(Slot::new(name, agent));
        self
    }

    pub fn with_reviewing(
        mut self,
        name: impl Into<String>,
        agent: Arc<dyn ReviewingAgent>,
    ) -> Self {
        self.reviewing = Some(Slot::new(name, agent));
        self
    }

    pub fn with_rewriting(
        mut self,
        name: impl Into<String>,
        agent: Arc<dyn RewritingAgent>,
    ) -> Self {
        self.rewriting = Some(Slot::new(name, agent));
        self
    }

    /// Stream progress events to `tx` while invoking.
    pub fn with_output_stream(mut self, tx: mpsc::Sender<PatternEvent>) -> Self {
        self.output_stream = Some(tx);
        self
    }

    /// Name of the agent bound to a stage.
    pub fn member(&self, stage: PipelineStage) -> Option<String> {
        match stage {
            PipelineStage::Rag => slot_name(&self.rag),
            PipelineStage::Reviewing => slot_name(&self.reviewing),
            PipelineStage::Rewriting => slot_name(&self.rewriting),
        }
    }

    async fn run_stage(
        &self,
        stage: PipelineStage,
        context: &PipelineContext,
    ) -> Result<Option<StageOutput>> {
        let output = match stage {
            PipelineStage::Rag => match &self.rag {
                Some(slot) => Some(slot.agent.retrieve(context).await?),
                None => None,
            },
            PipelineStage::Reviewing => match &self.reviewing {
                Some(slot) => Some(slot.agent.review(context).await?),
                None => None,
            },
            PipelineStage::Rewriting => match &self.rewriting {
                Some(slot) => Some(slot.agent.rewrite(context).await?),
                None => None,
            },
        };
        Ok(output)
    }
}

#[async_trait]
impl WorkPattern for SequentialPattern {
    type Request = PipelineRequest;
    type Output = PipelineResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn bind(&self, members: &Bindings) -> Result<Self> {
        let mut bound = Self {
            name: self.name.clone(),
            description: self.description.clone(),
            rag: None,
            reviewing: None,
            rewriting: None,
            output_stream: self.output_stream.clone(),
        };

        for slot in members.slots() {
            let Some(handle) = members.get(slot) else {
                continue;
            };
            match slot {
                Role::Rag => bound.rag = Some(Slot::new(handle.name(), handle.as_rag()?)),
                Role::Reviewing => {
                    bound.reviewing = Some(Slot::new(handle.name(), handle.as_reviewing()?));
                }
                Role::Rewriting => {
                    bound.rewriting = Some(Slot::new(handle.name(), handle.as_rewriting()?));
                }
                other => {
                    debug!(
                        pattern = %self.name,
                        slot = %other,
                        "Slot not used by pipeline pattern, ignoring"
                    );
                }
            }
        }

        Ok(bound)
    }

    async fn invoke(&self, request: PipelineRequest) -> Result<PipelineResult> {
        let stream = self.output_stream.as_ref();
        let mut context = PipelineContext::new(request.input);
        let mut stages = Vec::with_capacity(PipelineStage::ORDER.len());

        info!(pattern = %self.name, "Pipeline started");

        for stage in PipelineStage::ORDER {
            let agent = self.member(stage);
            let output = match self.run_stage(stage, &context).await? {
                Some(output) => {
                    info!(
                        pattern = %self.name,
                        %stage,
                        agent = agent.as_deref().unwrap_or("-"),
                        "Stage finished"
                    );
                    output
                }
                None => {
                    warn!(
                        pattern = %self.name,
                        %stage,
                        "No agent bound, stage contributes nothing"
                    );
                    StageOutput::default()
                }
            };

            context.absorb(stage, &output);
            emit(
                stream,
                PatternEvent::Stage {
                    stage,
                    agent: agent.clone(),
                    output: output.clone(),
                },
            )
            .await;
            stages.push(StageRecord {
                stage,
                agent,
                output,
            });
        }

        let result = PipelineResult { stages, context };
        let summary = result.summary_line();
        info!(pattern = %self.name, "{summary}");
        emit(
            stream,
            PatternEvent::Done {
                pattern: self.name.clone(),
                summary,
            },
        )
        .await;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::test_helpers::{FailingAgent, RecordingStage};
    use agora_core::{AgentHandle, BindingError, Error, MemberError};

    fn rag() -> Arc<RecordingStage> {
        Arc::new(RecordingStage::new(StageOutput {
            output: Some("Rust is memory safe.".into()),
            background: Some("ownership notes".into()),
            ..Default::default()
        }))
    }

    fn reviewer() -> Arc<RecordingStage> {
        Arc::new(RecordingStage::new(StageOutput {
            suggestion: Some("mention the borrow checker".into()),
            score: Some(0.6),
            ..Default::default()
        }))
    }

    fn rewriter() -> Arc<RecordingStage> {
        Arc::new(RecordingStage::new(StageOutput::text(
            "Rust is memory safe thanks to the borrow checker.",
        )))
    }

    #[tokio::test]
    async fn stages_thread_context_in_order() {
        let (rag, reviewer, rewriter) = (rag(), reviewer(), rewriter());
        let pattern = SequentialPattern::new("grr")
            .with_rag("rag_agent", rag.clone())
            .with_reviewing("reviewing_agent", reviewer.clone())
            .with_rewriting("rewriting_agent", rewriter.clone());

        let result = pattern
            .invoke(PipelineRequest::new("why is rust safe?"))
            .await
            .unwrap();

        assert_eq!(rag.seen()[0].input, "why is rust safe?");
        assert!(rag.seen()[0].background.is_none());

        let review_ctx = &reviewer.seen()[0];
        assert_eq!(review_ctx.background.as_deref(), Some("ownership notes"));
        assert_eq!(review_ctx.draft(), Some("Rust is memory safe."));

        let rewrite_ctx = &rewriter.seen()[0];
        assert_eq!(rewrite_ctx.suggestion.as_deref(), Some("mention the borrow checker"));
        assert_eq!(rewrite_ctx.review_score, Some(0.6));

        assert_eq!(
            result.answer(),
            Some("Rust is memory safe thanks to the borrow checker.")
        );
        assert_eq!(result.stages.len(), 3);
        assert!(result.context.rewriting_result.is_some());
    }

    #[tokio::test]
    async fn unbound_middle_stage_leaves_gap() {
        let rewriter = rewriter();
        let pattern = SequentialPattern::new("grr")
            .with_rag("rag_agent", rag())
            .with_rewriting("rewriting_agent", rewriter.clone());

        let result = pattern.invoke(PipelineRequest::new("q")).await.unwrap();

        let rewrite_ctx = &rewriter.seen()[0];
        assert!(rewrite_ctx.suggestion.is_none());
        assert_eq!(rewrite_ctx.draft(), Some("Rust is memory safe."));

        let review = result.get(PipelineStage::Reviewing).unwrap();
        assert!(review.is_empty());
        assert_eq!(result.stages[1].agent, None);
        assert!(result.answer().is_some());

        let json = result.to_json().unwrap();
        assert!(json.get("rag_result").is_some());
        assert!(json.get("reviewing_result").is_some());
        assert!(json.get("rewriting_result").is_some());
    }

    #[tokio::test]
    async fn rewriting_runs_without_reviewer() {
        let rewriter = rewriter();
        let pattern =
            SequentialPattern::new("grr").with_rewriting("rewriting_agent", rewriter.clone());

        let result = pattern.invoke(PipelineRequest::new("q")).await.unwrap();
        assert_eq!(rewriter.seen().len(), 1);
        assert!(result.answer().is_some());
    }

    #[tokio::test]
    async fn empty_pipeline_returns_every_stage() {
        let result = SequentialPattern::new("grr")
            .invoke(PipelineRequest::new("q"))
            .await
            .unwrap();

        assert_eq!(result.stages.len(), 3);
        assert!(result.stages.iter().all(|s| s.output.is_empty()));
        assert!(result.answer().is_none());
        assert!(result.summary_line().contains("answer missing"));
    }

    #[tokio::test]
    async fn member_error_stops_pipeline() {
        let rewriter = rewriter();
        let pattern = SequentialPattern::new("grr")
            .with_rag("rag_agent", rag())
            .with_reviewing("reviewing_agent", Arc::new(FailingAgent))
            .with_rewriting("rewriting_agent", rewriter.clone());

        let err = pattern.invoke(PipelineRequest::new("q")).await.unwrap_err();
        assert!(matches!(err, Error::Member(MemberError::ExecutionFailed { .. })));
        assert!(rewriter.seen().is_empty());
    }

    #[tokio::test]
    async fn bind_checks_capabilities() {
        let bindings = Bindings::new()
            .bind(Role::Rag, AgentHandle::rag("rag_agent", rag()))
            .bind(Role::Rewriting, AgentHandle::reviewing("reviewer", reviewer()));

        let err = SequentialPattern::new("grr").bind(&bindings).unwrap_err();
        assert!(matches!(
            err,
            Error::Binding(BindingError::TypeMismatch {
                slot: Role::Rewriting,
                actual: Role::Reviewing,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn bound_instance_streams_stage_events() {
        let (tx, mut rx) = mpsc::channel(16);
        let prototype = SequentialPattern::new("grr").with_output_stream(tx);
        let bindings = Bindings::new()
            .bind(Role::Rag, AgentHandle::rag("rag_agent", rag()))
            .bind(Role::Reviewing, AgentHandle::reviewing("reviewing_agent", reviewer()))
            .bind(Role::Rewriting, AgentHandle::rewriting("rewriting_agent", rewriter()));

        let bound = prototype.bind(&bindings).unwrap();
        assert_eq!(bound.member(PipelineStage::Reviewing).as_deref(), Some("reviewing_agent"));
        assert!(prototype.member(PipelineStage::Reviewing).is_none());

        bound.invoke(PipelineRequest::new("q")).await.unwrap();
        drop(bound);
        drop(prototype);

        let mut stages = Vec::new();
        while let Some(event) = rx.recv().await {
            if let PatternEvent::Stage { stage, .. } = event {
                stages.push(stage);
            }
        }
        assert_eq!(stages, PipelineStage::ORDER.to_vec());
    }
}

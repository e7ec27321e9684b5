//! Team runners — configured, memory-aware wrappers around work patterns.
//!
//! A team owns the configuration that names its members. On every run it
//! resolves those names through the registry, binds a fresh pattern
//! instance, invokes it, and records the exchange in session memory.

use std::sync::Arc;

use agora_config::{DebateConfig, MemoryConfig, PipelineConfig};
use agora_core::{
    AgentRegistry, Bindings, Memory, MemoryQuery, Message, MessageRole, Result, Role,
    SessionContext, SessionId, StageOutput,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::patterns::debate::{DebatePattern, DebateRequest, DebateResult, DebateSettings};
use crate::patterns::sequential::{PipelineRequest, PipelineResult, SequentialPattern};
use crate::patterns::work_pattern::WorkPattern;
use crate::stream_event::PatternEvent;

/// Resolve `name` for `slot`; a missing agent leaves the slot unbound.
fn resolve_into(
    bindings: &mut Bindings,
    registry: &dyn AgentRegistry,
    team: &str,
    slot: Role,
    name: &str,
) {
    match registry.resolve(name) {
        Some(handle) => bindings.insert(slot, handle),
        None => warn!(team, %slot, agent = name, "Agent not found in registry, slot left unbound"),
    }
}

/// Render prior session messages as background text.
fn render_history(messages: &[Message]) -> Option<String> {
    if messages.is_empty() {
        return None;
    }
    let lines: Vec<String> = messages
        .iter()
        .map(|m| match (m.role, &m.source) {
            (MessageRole::Assistant, Some(source)) => format!("{source}: {}", m.content),
            (MessageRole::Assistant, None) => format!("assistant: {}", m.content),
            (MessageRole::User, _) => format!("user: {}", m.content),
        })
        .collect();
    Some(lines.join("\n"))
}

/// A debate team: planning, critique and (optionally) executing members.
pub struct DebateTeam {
    config: DebateConfig,
    registry: Arc<dyn AgentRegistry>,
    memory: Option<Arc<dyn Memory>>,
    history_limit: usize,
    prototype: DebatePattern,
}

impl DebateTeam {
    pub fn new(config: DebateConfig, registry: Arc<dyn AgentRegistry>) -> Self {
        Self {
            config,
            registry,
            memory: None,
            history_limit: MemoryConfig::default().history_limit,
            prototype: DebatePattern::new("debate")
                .with_description("Planning and critique members debate until they agree"),
        }
    }

    pub fn with_memory(mut self, memory: Arc<dyn Memory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// How many prior session messages are passed as background.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_output_stream(mut self, tx: mpsc::Sender<PatternEvent>) -> Self {
        self.prototype = self.prototype.with_output_stream(tx);
        self
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Resolve the configured member names.
    ///
    /// The executing member is only looked up when execution is enabled.
    pub fn bindings(&self) -> Bindings {
        let mut bindings = Bindings::new();
        let registry = self.registry.as_ref();
        resolve_into(&mut bindings, registry, "debate", Role::Planning, &self.config.planning);
        resolve_into(&mut bindings, registry, "debate", Role::Critique, &self.config.critique);
        if self.config.execute_result {
            let executing = &self.config.executing;
            resolve_into(&mut bindings, registry, "debate", Role::Executing, executing);
        }
        bindings
    }

    /// A freshly bound pattern instance for one run.
    pub fn pattern(&self) -> Result<DebatePattern> {
        self.prototype.bind(&self.bindings())
    }

    pub async fn run(&self, input: &str, session: &SessionId) -> Result<DebateResult> {
        let pattern = self.pattern()?;

        let mut request = DebateRequest::new(input)
            .with_settings(DebateSettings::from(&self.config))
            .with_expert_framework(self.config.expert_framework.clone());
        if let Some(background) = self.recall(session).await? {
            request = request.with_background(background);
        }

        info!(%session, members = pattern.members().len(), "Debate team run started");
        let result = pattern.invoke(request).await?;
        self.record(input, session, &result).await?;
        Ok(result)
    }

    /// Run on a background task.
    pub fn spawn_run(
        self: Arc<Self>,
        input: String,
        session: SessionId,
    ) -> JoinHandle<Result<DebateResult>> {
        tokio::spawn(async move { self.run(&input, &session).await })
    }

    async fn recall(&self, session: &SessionId) -> Result<Option<String>> {
        let Some(memory) = &self.memory else {
            return Ok(None);
        };
        let query = MemoryQuery::session(session.clone()).limit(self.history_limit);
        let messages = memory.get(&query).await?;
        debug!(%session, recalled = messages.len(), "Session history recalled");
        Ok(render_history(&messages))
    }

    async fn record(&self, input: &str, session: &SessionId, result: &DebateResult) -> Result<()> {
        let Some(memory) = &self.memory else {
            return Ok(());
        };

        let mut messages = vec![Message::user(input)];
        let plan = if result.final_plan.framework.is_empty() {
            result.final_plan.thought.clone()
        } else {
            result.final_plan.framework.join("; ")
        };
        messages.push(
            Message::assistant(format!("Final plan: {plan} ({})", result.summary_line()))
                .from_agent(&self.config.planning)
                .with_metadata("rounds_executed", result.rounds_executed)
                .with_metadata("consensus_score", result.final_score())
                .with_metadata("consensus_reached", result.consensus_reached),
        );
        if result.executed() {
            let text = match &result.execution_result.executing_result {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            messages.push(Message::assistant(text).from_agent(&self.config.executing));
        }

        let context = SessionContext::new(session.clone()).with_agent("debate");
        memory.add(messages, &context).await?;
        Ok(())
    }
}

/// A pipeline team: rag, reviewing and rewriting members.
pub struct PipelineTeam {
    config: PipelineConfig,
    registry: Arc<dyn AgentRegistry>,
    memory: Option<Arc<dyn Memory>>,
    prototype: SequentialPattern,
}

impl PipelineTeam {
    pub fn new(config: PipelineConfig, registry: Arc<dyn AgentRegistry>) -> Self {
        Self {
            config,
            registry,
            memory: None,
            prototype: SequentialPattern::new("pipeline")
                .with_description("Retrieve and draft, review, then rewrite"),
        }
    }

    pub fn with_memory(mut self, memory: Arc<dyn Memory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_output_stream(mut self, tx: mpsc::Sender<PatternEvent>) -> Self {
        self.prototype = self.prototype.with_output_stream(tx);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve the configured stage agents. Empty names mean no agent.
    pub fn bindings(&self) -> Bindings {
        let mut bindings = Bindings::new();
        for role in [Role::Rag, Role::Reviewing, Role::Rewriting] {
            if let Some(name) = self.config.agent_for(role) {
                resolve_into(&mut bindings, self.registry.as_ref(), "pipeline", role, name);
            }
        }
        bindings
    }

    pub fn pattern(&self) -> Result<SequentialPattern> {
        self.prototype.bind(&self.bindings())
    }

    pub async fn run(&self, input: &str, session: &SessionId) -> Result<PipelineResult> {
        let pattern = self.pattern()?;
        info!(%session, "Pipeline team run started");
        let result = pattern.invoke(PipelineRequest::new(input)).await?;
        self.record(input, session, &result).await?;
        Ok(result)
    }

    /// Run on a background task.
    pub fn spawn_run(
        self: Arc<Self>,
        input: String,
        session: SessionId,
    ) -> JoinHandle<Result<PipelineResult>> {
        tokio::spawn(async move { self.run(&input, &session).await })
    }

    async fn record(
        &self,
        input: &str,
        session: &SessionId,
        result: &PipelineResult,
    ) -> Result<()> {
        let Some(memory) = &self.memory else {
            return Ok(());
        };

        let messages: Vec<Message> = result
            .stages
            .iter()
            .filter_map(|record| {
                let agent = record.agent.as_ref()?;
                let text = stage_text(&record.output)?;
                Some(
                    Message::assistant(format!(
                        "The agent responsible for {} is {agent}, Human: {input}, AI: {text}",
                        record.stage
                    ))
                    .from_agent(agent)
                    .with_metadata("stage", record.stage.to_string()),
                )
            })
            .collect();

        if messages.is_empty() {
            return Ok(());
        }
        let context = SessionContext::new(session.clone()).with_agent("pipeline");
        memory.add(messages, &context).await?;
        Ok(())
    }
}

/// The text a stage is remembered by: its output, or its review suggestion.
fn stage_text(output: &StageOutput) -> Option<&str> {
    output
        .output
        .as_deref()
        .or(output.suggestion.as_deref())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedAgent;
    use agora_core::{AgentHandle, BindingError, Error, InMemoryRegistry, MessageRole};
    use agora_memory::InMemoryMemory;
    use serde_json::json;

    fn debate_registry() -> InMemoryRegistry {
        let mut registry = InMemoryRegistry::new();
        registry.register(
            ScriptedAgent::new(
                "planning_agent",
                vec![
                    json!({"framework": ["draft outline"], "thought": "first pass"}),
                    json!({"framework": ["outline", "write", "edit"], "thought": "refined"}),
                ],
            )
            .into_handle(Role::Planning, ""),
        );
        registry.register(
            ScriptedAgent::new(
                "critique_agent",
                vec![
                    json!({"concerns": ["no budget"], "critique_score": 0.4}),
                    json!({"concerns": [], "critique_score": 0.9}),
                ],
            )
            .into_handle(Role::Critique, ""),
        );
        registry.register(
            ScriptedAgent::new("executing_agent", vec![json!({"executing_result": "done"})])
                .into_handle(Role::Executing, ""),
        );
        registry
    }

    fn pipeline_registry() -> InMemoryRegistry {
        let mut registry = InMemoryRegistry::new();
        registry.register(
            ScriptedAgent::new(
                "rag_agent",
                vec![json!({"output": "draft", "background": "facts"})],
            )
            .into_handle(Role::Rag, ""),
        );
        registry.register(
            ScriptedAgent::new("reviewing_agent", vec![json!({"suggestion": "cite sources"})])
                .into_handle(Role::Reviewing, ""),
        );
        registry.register(
            ScriptedAgent::new("rewriting_agent", vec![json!("final answer")])
                .into_handle(Role::Rewriting, ""),
        );
        registry
    }

    #[tokio::test]
    async fn debate_team_runs_configured_members() {
        let memory = Arc::new(InMemoryMemory::new());
        let team = DebateTeam::new(DebateConfig::default(), Arc::new(debate_registry()))
            .with_memory(memory.clone());
        let session = SessionId::from("s1");

        let result = team.run("plan a launch", &session).await.unwrap();
        assert_eq!(result.rounds_executed, 2);
        assert!(result.consensus_reached);
        assert_eq!(result.final_plan.thought, "refined");
        assert_eq!(result.execution_result.executing_result, "done");

        let history = memory.get(&MemoryQuery::session(session)).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "plan a launch");
        assert!(history[1].content.starts_with("Final plan: outline; write; edit"));
        assert_eq!(history[1].source.as_deref(), Some("planning_agent"));
        assert_eq!(history[1].metadata["rounds_executed"], 2);
        assert_eq!(history[1].metadata["consensus_reached"], true);
        assert_eq!(history[1].metadata["consensus_score"], 0.9);
        assert_eq!(history[2].content, "done");
    }

    #[tokio::test]
    async fn debate_team_skips_executor_lookup_when_disabled() {
        let config = DebateConfig {
            execute_result: false,
            ..DebateConfig::default()
        };
        let team = DebateTeam::new(config, Arc::new(debate_registry()));
        let bindings = team.bindings();
        assert!(bindings.get(Role::Executing).is_none());
        assert_eq!(bindings.len(), 2);

        let result = team.run("task", &SessionId::from("s")).await.unwrap();
        assert!(result.execution_result.is_empty());
    }

    #[tokio::test]
    async fn missing_agents_leave_slots_unbound() {
        let team = DebateTeam::new(DebateConfig::default(), Arc::new(InMemoryRegistry::new()));
        assert!(team.bindings().is_empty());

        let result = team.run("write a haiku", &SessionId::from("s")).await.unwrap();
        assert_eq!(result.rounds_executed, 1);
        assert_eq!(result.final_plan.framework, vec!["write a haiku".to_string()]);
    }

    #[tokio::test]
    async fn wrong_capability_is_rejected() {
        let mut registry = debate_registry();
        registry.register(
            ScriptedAgent::new("critique_agent", vec![]).into_handle(Role::Rewriting, ""),
        );
        let team = DebateTeam::new(DebateConfig::default(), Arc::new(registry));

        let err = team.run("task", &SessionId::from("s")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Binding(BindingError::TypeMismatch {
                slot: Role::Critique,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn session_history_becomes_background() {
        let memory = Arc::new(InMemoryMemory::new());
        let session = SessionId::from("s1");
        memory
            .add(
                vec![Message::user("earlier question")],
                &SessionContext::new(session.clone()),
            )
            .await
            .unwrap();

        let mut registry = InMemoryRegistry::new();
        let planner = Arc::new(crate::patterns::test_helpers::RecordingPlanner::new());
        registry.register(AgentHandle::planning("planning_agent", planner.clone()));
        let team = DebateTeam::new(DebateConfig::default(), Arc::new(registry)).with_memory(memory);

        team.run("follow-up", &session).await.unwrap();
        let seen = planner.inputs();
        assert_eq!(seen[0].background.as_deref(), Some("user: earlier question"));
    }

    #[tokio::test]
    async fn second_run_recalls_first_exchange() {
        let memory = Arc::new(InMemoryMemory::new());
        let session = SessionId::from("s1");
        DebateTeam::new(DebateConfig::default(), Arc::new(debate_registry()))
            .with_memory(memory.clone())
            .run("plan a launch", &session)
            .await
            .unwrap();

        let mut registry = debate_registry();
        let planner = Arc::new(crate::patterns::test_helpers::RecordingPlanner::new());
        registry.register(AgentHandle::planning("planning_agent", planner.clone()));
        let team = DebateTeam::new(DebateConfig::default(), Arc::new(registry))
            .with_memory(memory)
            .with_history_limit(3);

        team.run("follow-up", &session).await.unwrap();
        let background = planner.inputs()[0].background.clone().unwrap();
        let lines: Vec<_> = background.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "user: plan a launch");
        assert!(lines[1].starts_with("planning_agent: Final plan: outline; write; edit"));
        assert_eq!(lines[2], "executing_agent: done");
    }

    #[tokio::test]
    async fn debate_team_spawn_run() {
        let team = Arc::new(DebateTeam::new(
            DebateConfig::default(),
            Arc::new(debate_registry()),
        ));
        let handle = team.spawn_run("task".into(), SessionId::new());
        let result = handle.await.unwrap().unwrap();
        assert!(result.consensus_reached);
    }

    #[tokio::test]
    async fn pipeline_team_records_each_stage() {
        let memory = Arc::new(InMemoryMemory::new());
        let team = PipelineTeam::new(PipelineConfig::default(), Arc::new(pipeline_registry()))
            .with_memory(memory.clone());
        let session = SessionId::from("p1");

        let result = team.run("what is rust?", &session).await.unwrap();
        assert_eq!(result.answer(), Some("final answer"));

        let history = memory.get(&MemoryQuery::session(session.clone())).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(
            history[0].content,
            "The agent responsible for rag is rag_agent, Human: what is rust?, AI: draft"
        );
        assert_eq!(
            history[1].content,
            "The agent responsible for reviewing is reviewing_agent, \
             Human: what is rust?, AI: cite sources"
        );
        assert_eq!(history[2].source.as_deref(), Some("rewriting_agent"));
        assert_eq!(history[0].metadata["stage"], "rag");
        assert_eq!(history[2].metadata["stage"], "rewriting");

        let reviewer_only = memory
            .get(&MemoryQuery::session(session).agent("reviewing_agent"))
            .await
            .unwrap();
        assert_eq!(reviewer_only.len(), 1);
    }

    #[tokio::test]
    async fn empty_stage_name_means_no_agent() {
        let config = PipelineConfig {
            reviewing: String::new(),
            ..PipelineConfig::default()
        };
        let team = PipelineTeam::new(config, Arc::new(pipeline_registry()));
        assert!(team.bindings().get(Role::Reviewing).is_none());

        let result = team.run("q", &SessionId::from("p")).await.unwrap();
        assert!(result.context.suggestion.is_none());
        assert_eq!(result.stages.len(), 3);
        assert_eq!(result.answer(), Some("final answer"));
    }

    #[tokio::test]
    async fn pipeline_team_streams_events() {
        let (tx, mut rx) = mpsc::channel(16);
        let team = PipelineTeam::new(PipelineConfig::default(), Arc::new(pipeline_registry()))
            .with_output_stream(tx);

        team.run("q", &SessionId::from("p")).await.unwrap();
        drop(team);

        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            kinds.push(event.event_type());
        }
        assert_eq!(kinds, vec!["stage", "stage", "stage", "done"]);
    }
}

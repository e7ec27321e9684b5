//! Round-based debate pattern.
//!
//! A planning member proposes a task framework, a critique member scores
//! it, and the two iterate until the critique's consensus score reaches the
//! threshold or the round budget is spent. The last round's plan is then
//! optionally handed to an executing member.
//!
//! ```text
//!        ┌──────────── round r ────────────┐
//! input ─┤ plan(history) → critique(history) ├─ score ≥ threshold? ── yes ─┐
//!        └────────────────▲────────────────┘          │ no                │
//!                         └──── r < max_rounds ───────┘                   ▼
//!                                               final plan → execute (optional)
//! ```

use std::sync::Arc;

use agora_config::DebateConfig;
use agora_core::{
    Bindings, CritiqueAgent, CritiqueOutput, DebateInput, Error, ExecutingAgent, ExecutionOutput,
    ExpertFramework, PlanningAgent, PlanningOutput, Result, Role,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::patterns::work_pattern::{Slot, WorkPattern, slot_name};
use crate::stream_event::{PatternEvent, emit};

/// Loop controls for one debate invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebateSettings {
    /// Maximum number of rounds (at least 1).
    pub debate_rounds: u32,
    /// Score in [0, 1] at which the debate stops early.
    pub consensus_threshold: f64,
    /// Whether the executing member runs on the final plan.
    pub execute_result: bool,
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            debate_rounds: 3,
            consensus_threshold: 0.8,
            execute_result: true,
        }
    }
}

impl DebateSettings {
    pub fn validate(&self) -> Result<()> {
        if self.debate_rounds == 0 {
            return Err(Error::Config {
                message: "debate_rounds must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            return Err(Error::Config {
                message: format!(
                    "consensus_threshold must be between 0.0 and 1.0, got {}",
                    self.consensus_threshold
                ),
            });
        }
        Ok(())
    }
}

impl From<&DebateConfig> for DebateSettings {
    fn from(config: &DebateConfig) -> Self {
        Self {
            debate_rounds: config.debate_rounds,
            consensus_threshold: config.consensus_threshold,
            execute_result: config.execute_result,
        }
    }
}

/// Input for one debate invocation.
#[derive(Debug, Clone, Default)]
pub struct DebateRequest {
    pub input: String,
    pub settings: DebateSettings,
    pub background: Option<String>,
    pub expert_framework: ExpertFramework,
}

impl DebateRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: DebateSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn with_expert_framework(mut self, framework: ExpertFramework) -> Self {
        self.expert_framework = framework;
        self
    }
}

/// One planning + critique cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number.
    pub round: u32,
    pub planning: PlanningOutput,
    pub critique: CritiqueOutput,
    /// Agreement measure in [0, 1].
    pub consensus_score: f64,
}

/// Outcome of a debate invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateResult {
    /// Every executed round, in order.
    pub rounds: Vec<Round>,
    /// Planning output of the last executed round.
    pub final_plan: PlanningOutput,
    /// Empty when execution was disabled or no executing member is bound.
    pub execution_result: ExecutionOutput,
    pub consensus_reached: bool,
    pub rounds_executed: u32,
    /// The textual history members saw, oldest first.
    pub history: Vec<String>,
}

impl DebateResult {
    /// Score of the last executed round.
    pub fn final_score(&self) -> f64 {
        self.rounds.last().map(|r| r.consensus_score).unwrap_or(0.0)
    }

    pub fn executed(&self) -> bool {
        !self.execution_result.is_empty()
    }

    /// One-line summary for logging.
    pub fn summary_line(&self) -> String {
        format!(
            "Debate: {} round(s), {} (score {:.2}), plan with {} step(s){}",
            self.rounds_executed,
            if self.consensus_reached {
                "consensus reached"
            } else {
                "no consensus"
            },
            self.final_score(),
            self.final_plan.framework.len(),
            if self.executed() { ", executed" } else { "" },
        )
    }
}

/// Derive the consensus score from a critique.
///
/// An explicit finite `critique_score` is clamped to [0, 1]. Otherwise each
/// concern costs 0.1, floored at 0; no concerns is full agreement.
pub fn consensus_score(critique: &CritiqueOutput) -> f64 {
    match critique.critique_score {
        Some(score) if score.is_finite() => score.clamp(0.0, 1.0),
        _ => (1.0 - 0.1 * critique.concerns.len() as f64).max(0.0),
    }
}

fn critique_summary(round: u32, critique: &CritiqueOutput, score: f64) -> String {
    format!(
        "Debate round {round} critique result:\n- concerns: {:?}\n- suggestions: {:?}\n\
         - critique score: {score:.2}",
        critique.concerns, critique.suggestions,
    )
}

/// The debate work pattern.
#[derive(Debug, Clone)]
pub struct DebatePattern {
    name: String,
    description: String,
    planning: Option<Slot<dyn PlanningAgent>>,
    critique: Option<Slot<dyn CritiqueAgent>>,
    executing: Option<Slot<dyn ExecutingAgent>>,
    output_stream: Option<mpsc::Sender<PatternEvent>>,
}

impl DebatePattern {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            planning: None,
            critique: None,
            executing: None,
            output_stream: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_planning(mut self, name: impl Into<String>, agent: Arc<dyn PlanningAgent>) -> Self {
        self.planning = Some(Slot::new(name, agent));
        self
    }

    pub fn with_critique(mut self, name: impl Into<String>, agent: Arc<dyn CritiqueAgent>) -> Self {
        self.critique = Some(Slot::new(name, agent));
        self
    }

    pub fn with_executing(
        mut self,
        name: impl Into<String>,
        agent: Arc<dyn ExecutingAgent>,
    ) -> Self {
        self.executing = Some(Slot::new(name, agent));
        self
    }

    /// Stream progress events to `tx` while invoking.
    pub fn with_output_stream(mut self, tx: mpsc::Sender<PatternEvent>) -> Self {
        self.output_stream = Some(tx);
        self
    }

    /// Names of the bound members, by slot.
    pub fn members(&self) -> Vec<(Role, String)> {
        [
            (Role::Planning, slot_name(&self.planning)),
            (Role::Critique, slot_name(&self.critique)),
            (Role::Executing, slot_name(&self.executing)),
        ]
        .into_iter()
        .filter_map(|(role, name)| name.map(|n| (role, n)))
        .collect()
    }

    fn member_input(&self, request: &DebateRequest, history: &[String], role: Role) -> DebateInput {
        DebateInput {
            input: request.input.clone(),
            history: history.to_vec(),
            background: request.background.clone(),
            expert_guidance: request.expert_framework.for_role(role).map(str::to_string),
        }
    }

    async fn plan(&self, input: &DebateInput) -> Result<PlanningOutput> {
        match &self.planning {
            Some(slot) => Ok(slot.agent.plan(input).await?),
            None => Ok(PlanningOutput::from_input(&input.input)),
        }
    }

    async fn critique(&self, input: &DebateInput) -> Result<CritiqueOutput> {
        match &self.critique {
            Some(slot) => Ok(slot.agent.critique(input).await?),
            None => Ok(CritiqueOutput::default()),
        }
    }
}

#[async_trait]
impl WorkPattern for DebatePattern {
    type Request = DebateRequest;
    type Output = DebateResult;

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
            planning: None,
            critique: None,
            executing: None,
            output_stream: self.output_stream.clone(),
        };

        for slot in members.slots() {
            let Some(handle) = members.get(slot) else {
                continue;
            };
            match slot {
                Role::Planning => {
                    bound.planning = Some(Slot::new(handle.name(), handle.as_planning()?));
                }
                Role::Critique => {
                    bound.critique = Some(Slot::new(handle.name(), handle.as_critique()?));
                }
                Role::Executing => {
                    bound.executing = Some(Slot::new(handle.name(), handle.as_executing()?));
                }
                other => {
                    debug!(
                        pattern = %self.name,
                        slot = %other,
                        "Slot not used by debate pattern, ignoring"
                    );
                }
            }
        }

        Ok(bound)
    }

    async fn invoke(&self, request: DebateRequest) -> Result<DebateResult> {
        let settings = request.settings;
        settings.validate()?;

        if self.planning.is_none() {
            warn!(pattern = %self.name, "No planning member bound, using the input as the plan");
        }
        if self.critique.is_none() {
            warn!(pattern = %self.name, "No critique member bound, every plan is accepted");
        }

        info!(
            pattern = %self.name,
            max_rounds = settings.debate_rounds,
            threshold = settings.consensus_threshold,
            "Debate started"
        );

        let stream = self.output_stream.as_ref();
        let mut history: Vec<String> = Vec::new();
        let mut rounds: Vec<Round> = Vec::new();

        for round in 1..=settings.debate_rounds {
            info!(pattern = %self.name, round, "Debate round started");
            emit(
                stream,
                PatternEvent::RoundStarted {
                    round,
                    max_rounds: settings.debate_rounds,
                },
            )
            .await;

            let planning = self
                .plan(&self.member_input(&request, &history, Role::Planning))
                .await?;
            debug!(round, steps = planning.framework.len(), "Planning result received");
            history.push(format!(
                "Debate round {round} planning result: {}",
                planning.thought
            ));
            emit(
                stream,
                PatternEvent::Planning {
                    round,
                    agent: slot_name(&self.planning),
                    framework: planning.framework.clone(),
                    thought: planning.thought.clone(),
                },
            )
            .await;

            let critique = self
                .critique(&self.member_input(&request, &history, Role::Critique))
                .await?;
            let score = consensus_score(&critique);
            history.push(critique_summary(round, &critique, score));
            emit(
                stream,
                PatternEvent::Critique {
                    round,
                    agent: slot_name(&self.critique),
                    concerns: critique.concerns.clone(),
                    suggestions: critique.suggestions.clone(),
                    consensus_score: score,
                },
            )
            .await;

            info!(
                pattern = %self.name,
                round,
                concerns = critique.concerns.len(),
                score,
                "Debate round finished"
            );

            rounds.push(Round {
                round,
                planning,
                critique,
                consensus_score: score,
            });

            if score >= settings.consensus_threshold {
                break;
            }
        }

        let final_plan = rounds
            .last()
            .map(|r| r.planning.clone())
            .unwrap_or_else(|| PlanningOutput::from_input(&request.input));
        let consensus_reached = rounds
            .last()
            .is_some_and(|r| r.consensus_score >= settings.consensus_threshold);

        let execution_result = match (&self.executing, settings.execute_result) {
            (Some(slot), true) => {
                info!(pattern = %self.name, agent = %slot.name, "Executing final plan");
                let input = self.member_input(&request, &history, Role::Executing);
                let output = slot.agent.execute(&input, &final_plan).await?;
                emit(
                    stream,
                    PatternEvent::Execution {
                        agent: slot.name.clone(),
                        result: output.executing_result.clone(),
                    },
                )
                .await;
                output
            }
            (None, true) => {
                debug!(pattern = %self.name, "No executing member bound, skipping execution");
                ExecutionOutput::default()
            }
            (_, false) => ExecutionOutput::default(),
        };

        let result = DebateResult {
            rounds_executed: rounds.len() as u32,
            rounds,
            final_plan,
            execution_result,
            consensus_reached,
            history,
        };

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

//! Configuration loading, validation, and management for Agora.
//!
//! Loads configuration from `~/.agora/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use agora_core::{ExpertFramework, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.agora/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Debate work-pattern settings and member names
    #[serde(default)]
    pub debate: DebateConfig,

    /// Sequential pipeline member names
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Scripted agent declarations
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Maximum number of planning/critique rounds
    #[serde(default = "default_debate_rounds")]
    pub debate_rounds: u32,

    /// Consensus score at which the debate stops early
    #[serde(default = "default_consensus_threshold")]
    pub consensus_threshold: f64,

    /// Whether the executing member runs on the final plan
    #[serde(default = "default_true")]
    pub execute_result: bool,

    #[serde(default = "default_planning")]
    pub planning: String,

    #[serde(default = "default_critique")]
    pub critique: String,

    #[serde(default = "default_executing")]
    pub executing: String,

    /// Per-role guidance handed to members
    #[serde(default, skip_serializing_if = "ExpertFramework::is_empty")]
    pub expert_framework: ExpertFramework,
}

fn default_debate_rounds() -> u32 {
    3
}
fn default_consensus_threshold() -> f64 {
    0.8
}
fn default_true() -> bool {
    true
}
fn default_planning() -> String {
    "planning_agent".into()
}
fn default_critique() -> String {
    "critique_agent".into()
}
fn default_executing() -> String {
    "executing_agent".into()
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            debate_rounds: default_debate_rounds(),
            consensus_threshold: default_consensus_threshold(),
            execute_result: true,
            planning: default_planning(),
            critique: default_critique(),
            executing: default_executing(),
            expert_framework: ExpertFramework::default(),
        }
    }
}

/// Stage → agent-name bindings. An empty name means no agent for that stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_rag")]
    pub rag: String,

    #[serde(default = "default_reviewing")]
    pub reviewing: String,

    #[serde(default = "default_rewriting")]
    pub rewriting: String,
}

fn default_rag() -> String {
    "rag_agent".into()
}
fn default_reviewing() -> String {
    "reviewing_agent".into()
}
fn default_rewriting() -> String {
    "rewriting_agent".into()
}

impl PipelineConfig {
    /// The configured agent name for a pipeline role, if any.
    pub fn agent_for(&self, role: Role) -> Option<&str> {
        let name = match role {
            Role::Rag => &self.rag,
            Role::Reviewing => &self.reviewing,
            Role::Rewriting => &self.rewriting,
            _ => return None,
        };
        let name = name.trim();
        (!name.is_empty()).then_some(name)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rag: default_rag(),
            reviewing: default_reviewing(),
            rewriting: default_rewriting(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// "file", "in_memory" or "none"
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// How many messages a history read returns at most
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// JSONL file for the `file` backend (default: `~/.agora/memory/sessions.jsonl`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl MemoryConfig {
    /// Where the `file` backend keeps session history.
    pub fn file_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            AppConfig::config_dir()
                .join("memory")
                .join("sessions.jsonl")
        })
    }
}

fn default_memory_backend() -> String {
    "file".into()
}
fn default_history_limit() -> usize {
    50
}

const MEMORY_BACKENDS: [&str; 3] = ["file", "in_memory", "none"];

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            history_limit: default_history_limit(),
            path: None,
        }
    }
}

/// A scripted agent declaration.
///
/// ```toml
/// [[agents]]
/// name = "critique_agent"
/// role = "critique"
/// responses = [
///     { concerns = ["too vague"], critique_score = 0.4 },
///     { concerns = [], critique_score = 0.9 },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,

    /// One of: planning, critique, executing, rag, reviewing, rewriting
    pub role: String,

    #[serde(default)]
    pub description: String,

    /// Outputs replayed in order; the last one repeats.
    #[serde(default)]
    pub responses: Vec<serde_json::Value>,
}

impl AgentConfig {
    pub fn role(&self) -> Result<Role, ConfigError> {
        self.role.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "agent '{}' has unknown role '{}'",
                self.name, self.role
            ))
        })
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    ///
    /// Falls back to defaults if the config file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `AGORA_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rounds) = lookup("AGORA_DEBATE_ROUNDS") {
            self.debate.debate_rounds = rounds.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "AGORA_DEBATE_ROUNDS must be a positive integer, got '{rounds}'"
                ))
            })?;
        }

        if let Some(threshold) = lookup("AGORA_CONSENSUS_THRESHOLD") {
            self.debate.consensus_threshold = threshold.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "AGORA_CONSENSUS_THRESHOLD must be a number, got '{threshold}'"
                ))
            })?;
        }

        if let Some(execute) = lookup("AGORA_EXECUTE_RESULT") {
            self.debate.execute_result = match execute.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::ValidationError(format!(
                        "AGORA_EXECUTE_RESULT must be a boolean, got '{execute}'"
                    )));
                }
            };
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".agora")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debate.debate_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "debate_rounds must be at least 1".into(),
            ));
        }

        let threshold = self.debate.consensus_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ValidationError(
                "consensus_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if !MEMORY_BACKENDS.contains(&self.memory.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown memory backend '{}' (expected one of: {})",
                self.memory.backend,
                MEMORY_BACKENDS.join(", ")
            )));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "agent names must not be empty".into(),
                ));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate agent name '{}'",
                    agent.name
                )));
            }
            agent.role()?;
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `config --init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

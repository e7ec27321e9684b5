//! CLI subcommands.

pub mod agents;
pub mod config_cmd;
pub mod debate;
pub mod pipeline;
pub mod status;

use std::path::{Path, PathBuf};

use agora_agent::PatternEvent;
use agora_config::{AppConfig, ConfigError};
use agora_core::SessionId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Resolve the config file path: explicit flag or the default location.
pub fn config_file(path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) => p.to_path_buf(),
        None => AppConfig::config_dir().join("config.toml"),
    }
}

/// Load configuration with `AGORA_*` env overrides applied.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        None => AppConfig::load()?,
        Some(p) => {
            let mut config = AppConfig::load_from(p)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            config
        }
    };
    tracing::debug!(
        path = %config_file(path).display(),
        agents = config.agents.len(),
        memory = %config.memory.backend,
        "Configuration loaded"
    );
    Ok(config)
}

pub fn session_id(session: Option<String>) -> SessionId {
    session.map(SessionId).unwrap_or_default()
}

/// Print pattern events as they arrive. Finishes when every sender is dropped.
pub fn spawn_printer(mut rx: mpsc::Receiver<PatternEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_event(&event);
        }
    })
}

fn print_event(event: &PatternEvent) {
    match event {
        PatternEvent::RoundStarted { round, max_rounds } => {
            println!("\n── Round {round}/{max_rounds} ──");
        }
        PatternEvent::Planning {
            agent,
            framework,
            thought,
            ..
        } => {
            println!("  📝 Plan ({})", agent.as_deref().unwrap_or("input"));
            if !thought.is_empty() {
                println!("     {thought}");
            }
            for (i, step) in framework.iter().enumerate() {
                println!("     {}. {step}", i + 1);
            }
        }
        PatternEvent::Critique {
            agent,
            concerns,
            suggestions,
            consensus_score,
            ..
        } => {
            println!(
                "  🔍 Critique ({}) — score {consensus_score:.2}",
                agent.as_deref().unwrap_or("none")
            );
            for concern in concerns {
                println!("     ⚠️  {concern}");
            }
            for suggestion in suggestions {
                println!("     💡 {suggestion}");
            }
        }
        PatternEvent::Execution { agent, result } => {
            println!("\n  ⚙️  Executed by {agent}");
            match result {
                serde_json::Value::String(s) => println!("     {s}"),
                other => println!("     {other}"),
            }
        }
        PatternEvent::Stage {
            stage,
            agent,
            output,
        } => match agent {
            Some(agent) => {
                println!("\n── {stage} ({agent}) ──");
                if let Some(text) = &output.output {
                    println!("  {text}");
                }
                if let Some(suggestion) = &output.suggestion {
                    println!("  💡 {suggestion}");
                }
            }
            None => println!("\n── {stage} (skipped: no agent) ──"),
        },
        PatternEvent::Done { summary, .. } => {
            println!("\n✅ {summary}");
        }
    }
}

//! `agora debate` — Run a planning/critique debate on a task.

use std::path::Path;
use std::sync::Arc;

use agora_agent::{DebateSettings, DebateTeam, build_registry};
use tokio::sync::mpsc;

use super::{load_config, session_id, spawn_printer};

pub struct DebateOptions {
    pub rounds: Option<u32>,
    pub threshold: Option<f64>,
    pub no_execute: bool,
    pub session: Option<String>,
    pub json: bool,
}

pub async fn run(
    config_path: Option<&Path>,
    input: &str,
    options: DebateOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    let mut debate = config.debate.clone();
    if let Some(rounds) = options.rounds {
        debate.debate_rounds = rounds;
    }
    if let Some(threshold) = options.threshold {
        debate.consensus_threshold = threshold;
    }
    if options.no_execute {
        debate.execute_result = false;
    }
    DebateSettings::from(&debate).validate()?;

    let registry = Arc::new(build_registry(&config.agents)?);
    let memory = agora_memory::from_backend(&config.memory.backend, &config.memory.file_path());
    let session = session_id(options.session);

    let mut team = DebateTeam::new(debate, registry)
        .with_memory(memory)
        .with_history_limit(config.memory.history_limit);

    let printer = if options.json {
        None
    } else {
        let (tx, rx) = mpsc::channel(32);
        team = team.with_output_stream(tx);
        println!("🗣️  Debating: {input}");
        Some(spawn_printer(rx))
    };

    let result = team.run(input, &session).await;
    drop(team);
    if let Some(printer) = printer {
        let _ = printer.await;
    }
    let result = result?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("   Session: {session}");
    }

    Ok(())
}

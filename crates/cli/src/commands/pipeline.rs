//! `agora pipeline` — Run the rag → review → rewrite pipeline.

use std::path::Path;
use std::sync::Arc;

use agora_agent::{PipelineTeam, build_registry};
use tokio::sync::mpsc;

use super::{load_config, session_id, spawn_printer};

pub async fn run(
    config_path: Option<&Path>,
    input: &str,
    session: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    let registry = Arc::new(build_registry(&config.agents)?);
    let memory = agora_memory::from_backend(&config.memory.backend, &config.memory.file_path());
    let session = session_id(session);

    let mut team = PipelineTeam::new(config.pipeline.clone(), registry).with_memory(memory);

    let printer = if json {
        None
    } else {
        let (tx, rx) = mpsc::channel(16);
        team = team.with_output_stream(tx);
        println!("❓ {input}");
        Some(spawn_printer(rx))
    };

    let result = team.run(input, &session).await;
    drop(team);
    if let Some(printer) = printer {
        let _ = printer.await;
    }
    let result = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.to_json()?)?);
        return Ok(());
    }

    match result.answer() {
        Some(answer) => println!("\n💬 {answer}"),
        None => println!("\n⚠️  No rewriting agent produced an answer"),
    }
    Ok(())
}

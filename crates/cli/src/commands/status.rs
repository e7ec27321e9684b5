//! `agora status` — Show system status.

use std::path::Path;

use super::{config_file, load_config};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let path = config_file(config_path);

    let or_none = |name: &str| {
        if name.trim().is_empty() {
            "(none)".to_string()
        } else {
            name.to_string()
        }
    };

    println!("🏛️  Agora Status");
    println!("===============");
    println!("  Config file:  {}", path.display());
    println!(
        "  Debate:       {} round(s), threshold {}, execute {}",
        config.debate.debate_rounds,
        config.debate.consensus_threshold,
        if config.debate.execute_result { "on" } else { "off" }
    );
    println!("    planning:   {}", config.debate.planning);
    println!("    critique:   {}", config.debate.critique);
    println!("    executing:  {}", config.debate.executing);
    println!("  Pipeline:");
    println!("    rag:        {}", or_none(&config.pipeline.rag));
    println!("    reviewing:  {}", or_none(&config.pipeline.reviewing));
    println!("    rewriting:  {}", or_none(&config.pipeline.rewriting));
    println!(
        "  Memory:       {} (history limit {})",
        config.memory.backend, config.memory.history_limit
    );
    if config.memory.backend == "file" {
        println!("    file:       {}", config.memory.file_path().display());
    }
    println!("  Agents:       {}", config.agents.len());

    if path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `agora config init` first");
    }

    Ok(())
}

//! `agora agents` — List configured agents and the slots that use them.

use std::path::Path;

use agora_config::AppConfig;
use agora_core::Role;

use super::load_config;

/// Team slots that name an agent, as (slot label, agent name).
fn slot_references(config: &AppConfig) -> Vec<(String, String)> {
    let mut refs = vec![
        ("debate.planning".to_string(), config.debate.planning.clone()),
        ("debate.critique".to_string(), config.debate.critique.clone()),
    ];
    if config.debate.execute_result {
        refs.push(("debate.executing".into(), config.debate.executing.clone()));
    }
    for role in [Role::Rag, Role::Reviewing, Role::Rewriting] {
        if let Some(name) = config.pipeline.agent_for(role) {
            refs.push((format!("pipeline.{role}"), name.to_string()));
        }
    }
    refs
}

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let refs = slot_references(&config);

    println!("🤖 Configured agents ({})", config.agents.len());
    println!("========================");
    if config.agents.is_empty() {
        println!("  (none) — declare agents with [[agents]] in the config file");
    }
    for agent in &config.agents {
        let used_by: Vec<&str> = refs
            .iter()
            .filter(|(_, name)| *name == agent.name)
            .map(|(slot, _)| slot.as_str())
            .collect();
        println!(
            "  {:<20} {:<10} {} response(s){}",
            agent.name,
            agent.role,
            agent.responses.len(),
            if used_by.is_empty() {
                String::new()
            } else {
                format!("  ← {}", used_by.join(", "))
            }
        );
        if !agent.description.is_empty() {
            println!("  {:<20} {}", "", agent.description);
        }
    }

    let missing: Vec<_> = refs
        .iter()
        .filter(|(_, name)| !config.agents.iter().any(|a| &a.name == name))
        .collect();
    if !missing.is_empty() {
        println!();
        for (slot, name) in missing {
            println!("  ⚠️  {slot} names '{name}', which is not declared (slot runs unbound)");
        }
    }

    Ok(())
}

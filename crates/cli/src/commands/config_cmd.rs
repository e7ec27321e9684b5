//! `agora config` — Configuration management commands.

use std::path::Path;

use agora_config::AppConfig;

use super::{config_file, load_config};

pub async fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match load_config(config_path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();
            let declared = |name: &str| config.agents.iter().any(|a| a.name == name);

            if !declared(&config.debate.planning) {
                warnings.push(format!(
                    "Planning agent '{}' is not declared",
                    config.debate.planning
                ));
            }
            if !declared(&config.debate.critique) {
                warnings.push(format!(
                    "Critique agent '{}' is not declared; every plan will be accepted",
                    config.debate.critique
                ));
            }
            if config.memory.backend == "none" {
                warnings.push("Memory disabled; sessions will not carry history".into());
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Rounds:     {}", config.debate.debate_rounds);
            println!("   Threshold:  {}", config.debate.consensus_threshold);
            println!("   Execute:    {}", config.debate.execute_result);
            println!("   Memory:     {}", config.memory.backend);
            println!("   Agents:     {}", config.agents.len());
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config_file(config_path).display());
    Ok(())
}

pub async fn init(
    config_path: Option<&Path>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_file(config_path);
    if path.exists() && !force {
        return Err(format!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("✅ Wrote default config to {}", path.display());
    Ok(())
}

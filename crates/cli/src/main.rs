//! Agora CLI — the main entry point.
//!
//! Commands:
//! - `debate`    — Run a planning/critique debate on a task
//! - `pipeline`  — Run the rag → review → rewrite pipeline on a question
//! - `agents`    — List configured agents and the slots that use them
//! - `config`    — Show, locate, validate, or initialize configuration
//! - `status`    — Show system status

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "agora",
    about = "Agora — multi-agent debate and pipeline runner",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.agora/config.toml
    #[arg(short, long, global = true, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a planning/critique debate on a task
    Debate {
        /// The task to debate
        input: String,

        /// Override the maximum number of rounds
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Override the consensus threshold (0.0–1.0)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Skip executing the final plan
        #[arg(long)]
        no_execute: bool,

        /// Session to record the exchange under
        #[arg(short, long)]
        session: Option<String>,

        /// Print the full result as JSON instead of streaming progress
        #[arg(long)]
        json: bool,
    },

    /// Run the rag → review → rewrite pipeline on a question
    Pipeline {
        /// The question to answer
        input: String,

        /// Session to record the exchange under
        #[arg(short, long)]
        session: Option<String>,

        /// Print the full result as JSON instead of streaming progress
        #[arg(long)]
        json: bool,
    },

    /// List configured agents
    Agents,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show system status
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
    /// Validate the configuration
    Validate,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so `--json` output stays clean
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Debate {
            input,
            rounds,
            threshold,
            no_execute,
            session,
            json,
        } => {
            let options = commands::debate::DebateOptions {
                rounds,
                threshold,
                no_execute,
                session,
                json,
            };
            commands::debate::run(config_path, &input, options).await?
        }
        Commands::Pipeline {
            input,
            session,
            json,
        } => commands::pipeline::run(config_path, &input, session, json).await?,
        Commands::Agents => commands::agents::run(config_path).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path).await?,
            ConfigAction::Path => commands::config_cmd::path(config_path).await?,
            ConfigAction::Validate => commands::config_cmd::validate(config_path).await?,
            ConfigAction::Init { force } => commands::config_cmd::init(config_path, force).await?,
        },
        Commands::Status => commands::status::run(config_path).await?,
    }

    Ok(())
}

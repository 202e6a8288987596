pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use lilo_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "lilo",
    about = "Lilo conversation planner CLI",
    long_about = "Plan counselling conversations for fixture agents, jump agents between phases, and inspect configuration.",
    after_help = "Examples:\n  lilo plan --agent lilo-phase-4\n  lilo jump --agent lilo-phase-1 --phase 3\n  lilo agents\n  lilo --config config/lilo.toml config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Plan the shortest conversation from an agent's state to the target phase")]
    Plan {
        #[arg(long, help = "Agent identifier, e.g. lilo-phase-4")]
        agent: String,
    },
    #[command(about = "Overwrite an agent's beliefs with a phase's reference state")]
    Jump {
        #[arg(long, help = "Agent identifier, e.g. lilo-phase-1")]
        agent: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5), help = "Phase number 1..5")]
        phase: u8,
    },
    #[command(about = "List the fixture agents")]
    Agents,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    if let Ok(config) = AppConfig::load(options.clone()) {
        if let Err(error) = init_logging(&config) {
            eprintln!("logging disabled: {error}");
        }
    }

    let result = match cli.command {
        Command::Plan { agent } => commands::plan::run(&options, &agent),
        Command::Jump { agent, phase } => commands::jump::run(&options, &agent, phase),
        Command::Agents => commands::agents::run(&options),
        Command::Config => commands::config::run(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging(config: &AppConfig) -> Result<()> {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

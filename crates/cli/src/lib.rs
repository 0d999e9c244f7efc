pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use parley_core::FlowKind;

#[derive(Debug, Parser)]
#[command(
    name = "parley",
    about = "Parley voice-agent CLI",
    long_about = "Run console conversation sessions, seed demo data, inspect configuration, and check data-directory readiness.",
    after_help = "Examples:\n  parley seed\n  parley run --flow fraud\n  parley doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FlowArg {
    Improv,
    Tutor,
    Fraud,
}

impl FlowArg {
    pub fn kind(self) -> FlowKind {
        match self {
            Self::Improv => FlowKind::Round,
            Self::Tutor => FlowKind::Tutor,
            Self::Fraud => FlowKind::Fraud,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run a console conversation session against the chosen flow")]
    Run {
        #[arg(long, value_enum, default_value = "improv", help = "Conversation flow to run")]
        flow: FlowArg,
        #[arg(long, help = "Path to a parley.toml config file")]
        config: Option<PathBuf>,
    },
    #[command(about = "Write deterministic demo records into the data directory")]
    Seed,
    #[command(about = "Inspect effective configuration values with the API key redacted")]
    Config,
    #[command(about = "Validate config, data-directory writability, and record collections")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { flow, config } => commands::run::run(flow.kind(), config),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

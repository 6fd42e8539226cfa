mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{inspect, migrate, validate, InspectArgs, MigrateArgs, ValidateArgs};

/// Pipeflow CLI - load, upgrade, validate and inspect pipeline-flow documents
#[derive(Parser, Debug)]
#[command(name = "pipeflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check documents against the structural rules
    Validate(ValidateArgs),

    /// Upgrade a document to the latest schema version
    Migrate(MigrateArgs),

    /// Summarize a document's pipelines and findings
    Inspect(InspectArgs),
}

fn main() {
    // Internal traces stay quiet unless asked for via RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => validate(args),
        Command::Migrate(args) => migrate(args),
        Command::Inspect(args) => inspect(args),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

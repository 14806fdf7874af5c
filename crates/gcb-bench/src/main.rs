use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    generate::{self, GenerateArgs},
    plan::{self, PlanArgs},
    sweep::{self, SweepArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "gcb", about = "Graph coloring solver benchmark harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Optionally generate instances, then sweep the solver over a corpus folder.
    Sweep(SweepArgs),
    /// Generate random instances into a corpus folder.
    Generate(GenerateArgs),
    /// Print the expanded configurations and solver arguments without running anything.
    Plan(PlanArgs),
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    enable_tracing();
    let cli = Cli::parse();
    let result: Result<u8, Box<dyn Error>> = match cli.command {
        Command::Sweep(args) => sweep::run(&args),
        Command::Generate(args) => generate::run(&args).map(|()| 0),
        Command::Plan(args) => plan::run(&args).map(|()| 0),
    };
    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

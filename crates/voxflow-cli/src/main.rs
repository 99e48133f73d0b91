//! CLI entry point.
//!
//! `voxflow speak` streams text through the playback pipeline; `voxflow
//! serve` runs the HTTP facade. Exit code 0 only on fully normal
//! completion — interruption and failures exit non-zero.

mod progress;
mod serve;
mod speak;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voxflow_pipeline::PipelineOutcome;

/// Exit code when a run is interrupted (Ctrl-C), following shell convention.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "voxflow", version, about = "Streaming text-to-speech client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Speak text (or a file's contents) through the system audio output.
    Speak(speak::SpeakArgs),
    /// Run the HTTP facade.
    Serve(serve::ServeArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Speak(args) => match speak::run(args).await {
            Ok(PipelineOutcome::Completed) => Ok(ExitCode::SUCCESS),
            Ok(PipelineOutcome::Cancelled) => Ok(ExitCode::from(EXIT_INTERRUPTED)),
            Ok(PipelineOutcome::Failed) => Ok(ExitCode::FAILURE),
            Err(err) => Err(err),
        },
        Commands::Serve(args) => serve::run(args).await.map(|()| ExitCode::SUCCESS),
    };

    result.unwrap_or_else(|err| {
        eprintln!("error: {err:#}");
        ExitCode::FAILURE
    })
}

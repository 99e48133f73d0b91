//! The `speak` command: stream text through the pipeline to the speakers.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use tracing::debug;

use voxflow_pipeline::{Pipeline, PipelineConfig, PipelineOutcome};

use crate::progress::SentenceBars;

#[derive(Debug, Args)]
pub struct SpeakArgs {
    /// Text to speak, or a file path with --file.
    pub input: String,

    /// Treat the input as a file path and read the text from it.
    #[arg(short, long)]
    pub file: bool,

    /// Synthesis backend host.
    #[arg(long, default_value = "127.0.0.1", env = "VOXFLOW_BACKEND_IP")]
    pub ip: String,

    /// Synthesis backend port.
    #[arg(long, default_value_t = 9998, env = "VOXFLOW_BACKEND_PORT")]
    pub port: u16,

    /// Crossfade window at sentence seams, in milliseconds.
    #[arg(long, default_value_t = 150)]
    pub overlap_ms: u32,

    /// Socket read timeout in seconds; expiry ends the sentence's audio.
    #[arg(long, default_value_t = 10)]
    pub read_timeout_secs: u64,
}

/// How often the progress display is refreshed while the pipeline runs.
const REFRESH: Duration = Duration::from_millis(100);

pub async fn run(args: SpeakArgs) -> anyhow::Result<PipelineOutcome> {
    let text = if args.file {
        let path = PathBuf::from(&args.input);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
    } else {
        args.input
    };

    let config = PipelineConfig {
        host: args.ip,
        port: args.port,
        overlap_ms: args.overlap_ms,
        read_timeout: Duration::from_secs(args.read_timeout_secs),
        ..PipelineConfig::default()
    };

    let sentences = voxflow_core::segment(&text);
    if sentences.is_empty() {
        println!("Nothing to say.");
        return Ok(PipelineOutcome::Completed);
    }
    println!(
        "Speaking {} sentence(s) via {}",
        sentences.len(),
        config.backend_addr()
    );

    let started = Instant::now();
    let mut pipeline =
        Pipeline::start(&text, config).context("failed to start the audio pipeline")?;
    let canceller = pipeline.canceller();
    let bars = SentenceBars::new(&sentences);

    // Ctrl-C flips the cancel flag; the run loop below notices and unwinds.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            canceller.cancel();
        }
    });

    let outcome = tokio::task::spawn_blocking(move || {
        let outcome = loop {
            bars.update(&pipeline.progress());
            if let Some(outcome) = pipeline.wait_timeout(REFRESH) {
                break outcome;
            }
        };
        bars.update(&pipeline.progress());
        if outcome == PipelineOutcome::Cancelled {
            bars.abandon();
        }
        outcome
    })
    .await
    .context("pipeline task panicked")?;

    match outcome {
        PipelineOutcome::Completed => {
            println!("Finished in {:.1}s", started.elapsed().as_secs_f64());
        }
        PipelineOutcome::Cancelled => {
            println!("Interrupted after {:.1}s", started.elapsed().as_secs_f64());
        }
        PipelineOutcome::Failed => {
            eprintln!("No sentence could be synthesized — is the backend up?");
        }
    }
    Ok(outcome)
}

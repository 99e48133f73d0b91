//! Pipeline lifecycle coordinator.
//!
//! `Pipeline::start` segments the text, opens the audio device, and spawns
//! one fetch worker per sentence plus the reassembly thread. The device is
//! opened *before* any network work: if there is nowhere to play, nothing
//! is fetched.
//!
//! Shutdown is idempotent and bounded: the cancel flag is raised, the audio
//! thread is stopped, every worker is joined with a timeout after which it
//! is abandoned, and whatever backend connections are still registered get
//! force-closed.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use voxflow_core::segment;

use crate::config::PipelineConfig;
use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::playback::PlaybackHandle;
use crate::progress::SentenceProgress;
use crate::{fetch, reassembly};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every sentence was fetched (or individual ones degraded to silence)
    /// and played out.
    Completed,
    /// The run was cancelled before completion.
    Cancelled,
    /// Every single fetch failed — the backend never answered at all.
    Failed,
}

/// A running speak-this-text pipeline.
pub struct Pipeline {
    ctx: Arc<PipelineContext>,
    audio: Option<PlaybackHandle>,
    reassembly: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
    done: Receiver<()>,
    shut_down: bool,
}

impl Pipeline {
    /// Start speaking `text`.
    ///
    /// # Errors
    ///
    /// Fails if the audio output stream cannot be opened. Backend failures
    /// are not start errors: each sentence degrades to silence on its own.
    pub fn start(text: &str, config: PipelineConfig) -> Result<Self, PipelineError> {
        let sentences = segment(text);
        let total = sentences.len();
        let ctx = Arc::new(PipelineContext::new(config, total));
        let (done_tx, done_rx) = channel();

        info!(sentences = total, backend = %ctx.config.backend_addr(), "pipeline starting");

        // Nothing to say: no device, no workers, already finished.
        if total == 0 {
            let _ = ctx.finish_playback_once();
            let _ = done_tx.send(());
            return Ok(Self {
                ctx,
                audio: None,
                reassembly: None,
                workers: Vec::new(),
                done: done_rx,
                shut_down: false,
            });
        }

        // Device first. If this fails the network is never touched.
        let audio = PlaybackHandle::spawn(Arc::clone(&ctx), done_tx)?;

        let (result_tx, result_rx) = channel();
        let reassembly = spawn_reassembly(&ctx, result_rx)?;
        let workers = spawn_workers(&ctx, sentences, &result_tx)?;
        drop(result_tx);

        Ok(Self {
            ctx,
            audio: Some(audio),
            reassembly: Some(reassembly),
            workers,
            done: done_rx,
            shut_down: false,
        })
    }

    /// Request cancellation. One-way and idempotent; returns immediately.
    /// The run winds down asynchronously — use [`Self::wait`] to block until
    /// it has.
    pub fn cancel(&self) {
        self.ctx.cancel();
    }

    /// A cheap handle that can cancel this run from another thread.
    #[must_use]
    pub fn canceller(&self) -> Canceller {
        Canceller {
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.ctx.is_cancelled()
    }

    /// Snapshot of per-sentence progress, in playback order.
    #[must_use]
    pub fn progress(&self) -> Vec<SentenceProgress> {
        self.ctx.progress.snapshot()
    }

    /// Number of sentences in this run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.ctx.total
    }

    /// Block until playback ends (normally or by cancellation), then tear
    /// everything down.
    pub fn wait(&mut self) -> PipelineOutcome {
        let _ = self.done.recv();
        let outcome = self.outcome();
        self.shutdown();
        outcome
    }

    /// Like [`Self::wait`] with a deadline. Returns `None` if the run is
    /// still going when the timeout expires; the pipeline is left running.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<PipelineOutcome> {
        match self.done.recv_timeout(timeout) {
            Ok(()) => {
                let outcome = self.outcome();
                self.shutdown();
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                let outcome = self.outcome();
                self.shutdown();
                Some(outcome)
            }
        }
    }

    fn outcome(&self) -> PipelineOutcome {
        if self.ctx.is_cancelled() || !self.ctx.all_fetches_done() || !self.ctx.all_consumed() {
            PipelineOutcome::Cancelled
        } else if self.ctx.all_fetches_failed() {
            PipelineOutcome::Failed
        } else {
            PipelineOutcome::Completed
        }
    }

    /// Tear the run down. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        self.ctx.cancel();

        if let Some(mut audio) = self.audio.take() {
            audio.stop();
        }

        let join_timeout = self.ctx.config.join_timeout;
        if let Some(handle) = self.reassembly.take() {
            join_bounded(handle, "voxflow-reassembly", join_timeout);
        }
        for handle in self.workers.drain(..) {
            join_bounded(handle, "voxflow-fetch", join_timeout);
        }

        // Anything still registered belongs to an abandoned worker.
        self.ctx.connections.force_close_all();

        debug!("pipeline shut down");
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Detached cancellation handle for a [`Pipeline`].
#[derive(Clone)]
pub struct Canceller {
    ctx: Arc<PipelineContext>,
}

impl Canceller {
    pub fn cancel(&self) {
        self.ctx.cancel();
    }
}

fn spawn_reassembly(
    ctx: &Arc<PipelineContext>,
    results: Receiver<fetch::FetchResult>,
) -> Result<JoinHandle<()>, PipelineError> {
    let ctx = Arc::clone(ctx);
    let handle = std::thread::Builder::new()
        .name("voxflow-reassembly".into())
        .spawn(move || reassembly::run(&ctx, &results))?;
    Ok(handle)
}

fn spawn_workers(
    ctx: &Arc<PipelineContext>,
    sentences: Vec<voxflow_core::Sentence>,
    results: &Sender<fetch::FetchResult>,
) -> Result<Vec<JoinHandle<()>>, PipelineError> {
    sentences
        .into_iter()
        .map(|sentence| {
            let ctx = Arc::clone(ctx);
            let results = results.clone();
            let handle = std::thread::Builder::new()
                .name(format!("voxflow-fetch-{}", sentence.index))
                .spawn(move || fetch::run_worker(&ctx, sentence.index, sentence.text, &results))?;
            Ok(handle)
        })
        .collect()
}

/// Join a thread, abandoning it if it does not finish within `timeout`.
fn join_bounded(handle: JoinHandle<()>, name: &str, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!(thread = name, ?timeout, "thread did not stop in time, abandoning");
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    if handle.join().is_err() {
        warn!(thread = name, "thread panicked");
    }
}

//! Real-time audio output.
//!
//! `cpal::Stream` is not `Send`, so the stream lives on a dedicated OS
//! thread for its whole lifetime. The spawning thread waits on an init
//! handshake (device opened, stream started) before the pipeline is
//! considered running; dropping the handle shuts the thread down.
//!
//! The render callback never blocks and never allocates: it copies from
//! the shared buffer, zero-fills any shortfall, and signals completion
//! exactly once when the run is finished.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use tracing::{debug, error, info};

use crate::context::PipelineContext;
use crate::error::PipelineError;

/// Outcome of rendering one output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// More audio is (or may still be) coming.
    Pending,
    /// The run is over: everything consumed and drained, or cancelled.
    Finished,
}

/// Fill one output frame from the shared buffer.
///
/// Factored out of the cpal callback so the drain/underrun/completion
/// logic is testable without a device.
pub fn render_frame(ctx: &PipelineContext, out: &mut [f32]) -> FrameOutcome {
    if ctx.is_cancelled() {
        out.fill(0.0);
        return FrameOutcome::Finished;
    }

    // Contended lock counts as an underrun: emit silence rather than stall
    // the device. A poisoned lock means the reassembly thread died; end the
    // run instead of spinning on silence.
    let mut buffer = match ctx.buffer.try_lock() {
        Ok(buffer) => buffer,
        Err(std::sync::TryLockError::WouldBlock) => {
            out.fill(0.0);
            return FrameOutcome::Pending;
        }
        Err(std::sync::TryLockError::Poisoned(_)) => {
            out.fill(0.0);
            return FrameOutcome::Finished;
        }
    };
    buffer.read_into(out);

    // Finished only when no more audio can arrive and none is left unplayed.
    if ctx.all_consumed() && ctx.all_fetches_done() && buffer.unread() == 0 {
        FrameOutcome::Finished
    } else {
        FrameOutcome::Pending
    }
}

enum Command {
    Shutdown,
}

/// Handle to the audio thread. Dropping it stops playback.
pub struct PlaybackHandle {
    commands: Sender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    /// Spawn the audio thread and block until the output stream is running
    /// (or failed to start).
    ///
    /// `done` receives one message the first time the render callback
    /// observes the end of the run.
    pub fn spawn(ctx: Arc<PipelineContext>, done: Sender<()>) -> Result<Self, PipelineError> {
        let (init_tx, init_rx) = channel::<Result<(), PipelineError>>();
        let (cmd_tx, cmd_rx) = channel::<Command>();

        let thread = std::thread::Builder::new()
            .name("voxflow-audio".into())
            .spawn(move || audio_thread(&ctx, &done, &init_tx, &cmd_rx))?;

        match init_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                commands: cmd_tx,
                thread: Some(thread),
            }),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => {
                let _ = thread.join();
                Err(PipelineError::AudioThreadDied)
            }
        }
    }

    /// Stop playback and join the audio thread. Idempotent.
    pub fn stop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Audio thread body: open the stream, report readiness, then park until
/// told to shut down. The stream is dropped (and the device released) on
/// the way out.
fn audio_thread(
    ctx: &Arc<PipelineContext>,
    done: &Sender<()>,
    init: &Sender<Result<(), PipelineError>>,
    commands: &Receiver<Command>,
) {
    let stream = match build_output_stream(ctx, done) {
        Ok(stream) => {
            let _ = init.send(Ok(()));
            stream
        }
        Err(err) => {
            let _ = init.send(Err(err));
            return;
        }
    };

    // Blocks until Shutdown arrives or the handle is dropped.
    match commands.recv() {
        Ok(Command::Shutdown) | Err(_) => {}
    }

    drop(stream);
    debug!("audio thread stopped");
}

fn build_output_stream(
    ctx: &Arc<PipelineContext>,
    done: &Sender<()>,
) -> Result<cpal::Stream, PipelineError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(PipelineError::NoOutputDevice)?;

    let config = StreamConfig {
        channels: 1,
        sample_rate: SampleRate(ctx.config.sample_rate),
        buffer_size: BufferSize::Default,
    };
    info!(
        device = device.name().unwrap_or_else(|_| "<unknown>".into()),
        sample_rate = ctx.config.sample_rate,
        "opening output stream"
    );

    let render_ctx = Arc::clone(ctx);
    let done = done.clone();
    let stream = device
        .build_output_stream(
            &config,
            move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if render_frame(&render_ctx, out) == FrameOutcome::Finished
                    && render_ctx.finish_playback_once()
                {
                    let _ = done.send(());
                }
            },
            |err| error!(error = %err, "output stream error"),
            None,
        )
        .map_err(|err| PipelineError::OutputStream(err.to_string()))?;

    stream
        .play()
        .map_err(|err| PipelineError::OutputStream(err.to_string()))?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use crate::config::PipelineConfig;

    use super::*;

    fn ctx(total: usize) -> PipelineContext {
        PipelineContext::new(PipelineConfig::default(), total)
    }

    #[test]
    fn underrun_zero_fills_and_stays_pending() {
        let context = ctx(1);
        context.buffer.lock().unwrap().extend(&[0.25, 0.75]);

        let mut out = [9.0f32; 4];
        assert_eq!(render_frame(&context, &mut out), FrameOutcome::Pending);
        assert_eq!(out, [0.25, 0.75, 0.0, 0.0]);
    }

    #[test]
    fn finishes_only_after_everything_is_drained() {
        let context = ctx(1);
        context.buffer.lock().unwrap().extend(&[0.1, 0.2]);
        context.mark_fetch_done();
        context.mark_consumed();

        let mut out = [0.0f32; 2];
        // First frame drains the buffer and already observes the end.
        assert_eq!(render_frame(&context, &mut out), FrameOutcome::Finished);
    }

    #[test]
    fn pending_while_fetches_remain() {
        let context = ctx(2);
        context.mark_fetch_done();
        context.mark_consumed();

        let mut out = [0.0f32; 4];
        assert_eq!(render_frame(&context, &mut out), FrameOutcome::Pending);
    }

    #[test]
    fn cancellation_finishes_with_silence() {
        let context = ctx(3);
        context.buffer.lock().unwrap().extend(&[0.5; 8]);
        context.cancel();

        let mut out = [9.0f32; 4];
        assert_eq!(render_frame(&context, &mut out), FrameOutcome::Finished);
        assert_eq!(out, [0.0; 4]);
    }
}

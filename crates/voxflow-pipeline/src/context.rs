//! Shared state for one pipeline run.
//!
//! One `PipelineContext` is created per run and handed (as an `Arc`) to the
//! fetch workers, the reassembly thread, and the audio callback. Cancellation
//! is a one-way flag: once set it is never cleared for the lifetime of the
//! run.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::buffer::PlaybackBuffer;
use crate::config::PipelineConfig;
use crate::conn::ConnectionRegistry;
use crate::progress::ProgressBoard;

pub struct PipelineContext {
    /// Run configuration, fixed at start.
    pub config: PipelineConfig,

    /// Total number of sentences in this run.
    pub total: usize,

    /// One-way cancellation flag.
    cancelled: AtomicBool,

    /// Shared playback buffer.
    pub buffer: Mutex<PlaybackBuffer>,

    /// Per-sentence progress slots.
    pub progress: ProgressBoard,

    /// Live backend connections, for force-close on shutdown.
    pub connections: ConnectionRegistry,

    /// Sentences whose fetch has finished (in any terminal state).
    fetches_done: AtomicUsize,

    /// Sentences whose fetch failed outright (connection or protocol error).
    fetch_failures: AtomicUsize,

    /// Sentences consumed by the reassembly thread.
    consumed: AtomicUsize,

    /// Guards the one-shot playback-finished signal.
    playback_finished: AtomicBool,
}

impl PipelineContext {
    #[must_use]
    pub fn new(config: PipelineConfig, total: usize) -> Self {
        Self {
            config,
            total,
            cancelled: AtomicBool::new(false),
            buffer: Mutex::new(PlaybackBuffer::new()),
            progress: ProgressBoard::new(total),
            connections: ConnectionRegistry::new(),
            fetches_done: AtomicUsize::new(0),
            fetch_failures: AtomicUsize::new(0),
            consumed: AtomicUsize::new(0),
            playback_finished: AtomicBool::new(false),
        }
    }

    // ── cancellation ──

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    // ── completion accounting ──

    pub fn mark_fetch_done(&self) {
        self.fetches_done.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn fetches_done(&self) -> usize {
        self.fetches_done.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn all_fetches_done(&self) -> bool {
        self.fetches_done() >= self.total
    }

    pub fn mark_fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether every sentence's fetch failed outright. False for an empty
    /// run.
    #[must_use]
    pub fn all_fetches_failed(&self) -> bool {
        self.total > 0 && self.fetch_failures.load(Ordering::SeqCst) >= self.total
    }

    pub fn mark_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn all_consumed(&self) -> bool {
        self.consumed.load(Ordering::SeqCst) >= self.total
    }

    /// True exactly once, for whichever caller observes the end of playback
    /// first. Subsequent calls return false.
    pub fn finish_playback_once(&self) -> bool {
        !self.playback_finished.swap(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(total: usize) -> PipelineContext {
        PipelineContext::new(PipelineConfig::default(), total)
    }

    #[test]
    fn cancellation_is_one_way() {
        let context = ctx(1);
        assert!(!context.is_cancelled());
        context.cancel();
        context.cancel();
        assert!(context.is_cancelled());
    }

    #[test]
    fn completion_requires_every_sentence() {
        let context = ctx(2);
        context.mark_fetch_done();
        assert!(!context.all_fetches_done());
        context.mark_fetch_done();
        assert!(context.all_fetches_done());

        context.mark_consumed();
        assert!(!context.all_consumed());
        context.mark_consumed();
        assert!(context.all_consumed());
    }

    #[test]
    fn all_failed_requires_every_fetch_to_fail() {
        let context = ctx(2);
        context.mark_fetch_failed();
        assert!(!context.all_fetches_failed());
        context.mark_fetch_failed();
        assert!(context.all_fetches_failed());

        // An empty run never counts as failed.
        assert!(!ctx(0).all_fetches_failed());
    }

    #[test]
    fn playback_finished_fires_once() {
        let context = ctx(0);
        assert!(context.finish_playback_once());
        assert!(!context.finish_playback_once());
    }
}

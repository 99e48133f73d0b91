//! Pipeline error types.

/// Errors that can occur while running the streaming pipeline.
///
/// Per-sentence fetch failures are deliberately *not* represented here —
/// they degrade to silence for that sentence and surface through the
/// progress board instead. These variants are the pipeline-wide failures.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No audio output device found.
    #[error("No audio output device found")]
    NoOutputDevice,

    /// Failed to open or start the audio output stream.
    #[error("Failed to open audio output stream: {0}")]
    OutputStream(String),

    /// The dedicated audio thread died before reporting readiness.
    #[error("Audio thread terminated unexpectedly")]
    AudioThreadDied,

    /// Could not spawn a worker thread.
    #[error("Failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}

//! Streaming text-to-speech pipeline.
//!
//! Turns a block of text into live audio against a raw-TCP synthesis
//! backend: the text is split into sentences, every sentence is fetched on
//! its own connection concurrently, results are reassembled in sentence
//! order with a crossfade at each seam, and a real-time callback plays the
//! assembled stream as it grows — playback of sentence N starts while
//! sentence N+1 is still being synthesized.
//!
//! ```no_run
//! use voxflow_pipeline::{Pipeline, PipelineConfig};
//!
//! # fn main() -> Result<(), voxflow_pipeline::PipelineError> {
//! let mut pipeline = Pipeline::start("Hello world. This is a test!", PipelineConfig::default())?;
//! pipeline.wait();
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod config;
pub mod conn;
pub mod context;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod playback;
pub mod progress;
pub mod reassembly;

pub use buffer::PlaybackBuffer;
pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::PipelineError;
pub use fetch::{FetchResult, SENTINEL, probe, synthesize};
pub use pipeline::{Canceller, Pipeline, PipelineOutcome};
pub use progress::{ProgressBoard, SentencePhase, SentenceProgress};

//! Core building blocks for the voxflow streaming-synthesis pipeline.
//!
//! Everything in this crate is pure computation — no sockets, no threads,
//! no audio devices. The pipeline crate composes these pieces around the
//! actual I/O.

pub mod crossfade;
pub mod sample;
pub mod segment;
pub mod wav;

// Re-export key types for convenience
pub use crossfade::{CrossfadeMixer, overlap_samples};
pub use sample::{SAMPLE_WIDTH, decode_samples};
pub use segment::{Sentence, segment, sentences};
pub use wav::encode_wav;

//! Crossfade splicing at chunk boundaries.
//!
//! Independently synthesized sentences start and end at arbitrary sample
//! values; butting them together clicks audibly. The mixer blends the tail
//! of the audio already assembled with the head of the incoming chunk over
//! a fixed overlap window using complementary linear fades.

/// Number of overlap samples for a given rate and window length.
#[must_use]
pub fn overlap_samples(sample_rate: u32, overlap_ms: u32) -> usize {
    (sample_rate as usize * overlap_ms as usize) / 1000
}

/// Splices audio chunks with a linear crossfade.
///
/// The fade curves are precomputed once: `fade_out[i] = 1 − i/overlap`,
/// `fade_in[i] = i/overlap`. They sum to 1 at every position, so a blend of
/// two equal signals is that signal again.
#[derive(Debug, Clone)]
pub struct CrossfadeMixer {
    overlap: usize,
    fade_out: Vec<f32>,
    fade_in: Vec<f32>,
}

impl CrossfadeMixer {
    /// Create a mixer blending over `overlap` samples. An overlap of zero
    /// degrades to plain concatenation.
    #[must_use]
    pub fn new(overlap: usize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let fade_in: Vec<f32> = (0..overlap).map(|i| i as f32 / overlap as f32).collect();
        let fade_out: Vec<f32> = fade_in.iter().map(|f| 1.0 - f).collect();
        Self {
            overlap,
            fade_out,
            fade_in,
        }
    }

    /// The overlap window length in samples.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Append `chunk` to `buffer`, crossfading at the seam.
    ///
    /// The blend only happens when both sides hold at least `overlap`
    /// samples; otherwise the chunk is appended unmodified. Each append of
    /// an eligible chunk therefore grows the buffer by exactly
    /// `chunk.len() − overlap` samples.
    pub fn append(&self, buffer: &mut Vec<f32>, chunk: &[f32]) {
        if self.overlap == 0 || buffer.len() < self.overlap || chunk.len() < self.overlap {
            buffer.extend_from_slice(chunk);
            return;
        }

        let tail_start = buffer.len() - self.overlap;
        for i in 0..self.overlap {
            buffer[tail_start + i] =
                buffer[tail_start + i] * self.fade_out[i] + chunk[i] * self.fade_in[i];
        }
        buffer.extend_from_slice(&chunk[self.overlap..]);
    }

    /// Mix an ordered sequence of optional chunks into one buffer.
    ///
    /// Absent and empty chunks are skipped — a failed sentence contributes
    /// zero samples, not a pause. Used by the HTTP façade, which assembles
    /// the whole utterance offline instead of streaming it to a device.
    #[must_use]
    pub fn mix_chunks(&self, chunks: &[Option<Vec<f32>>]) -> Vec<f32> {
        let mut mixed = Vec::new();
        for chunk in chunks.iter().flatten() {
            if !chunk.is_empty() {
                self.append(&mut mixed, chunk);
            }
        }
        mixed
    }
}

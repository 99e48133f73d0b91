//! Shared playback buffer.
//!
//! Single contiguous sample vector with a read cursor. The reassembly
//! thread appends crossfaded chunks at the tail; the audio callback reads
//! from the cursor. Consumed samples are retained, so a chunk arriving
//! after the cursor still lands at the correct absolute position.

/// Append-only f32 sample buffer with a monotonic read cursor.
#[derive(Default)]
pub struct PlaybackBuffer {
    samples: Vec<f32>,
    read_cursor: usize,
}

impl PlaybackBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append samples at the tail.
    pub fn extend(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
    }

    /// Replace the last `overlap` samples and append the rest. Used by the
    /// reassembly thread after crossfade blending.
    pub fn splice_tail(&mut self, overlap: usize, blended: &[f32]) {
        let keep = self.samples.len().saturating_sub(overlap);
        self.samples.truncate(keep);
        self.samples.extend_from_slice(blended);
    }

    /// Fill `out` from the cursor, zero-filling whatever is not available,
    /// and advance the cursor by the amount actually read. Never blocks.
    ///
    /// Returns the number of real (non-padding) samples written.
    pub fn read_into(&mut self, out: &mut [f32]) -> usize {
        let available = self.samples.len() - self.read_cursor;
        let n = available.min(out.len());
        out[..n].copy_from_slice(&self.samples[self.read_cursor..self.read_cursor + n]);
        out[n..].fill(0.0);
        self.read_cursor += n;
        n
    }

    /// Total samples ever appended.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples appended but not yet consumed.
    #[must_use]
    pub fn unread(&self) -> usize {
        self.samples.len() - self.read_cursor
    }

    /// Tail window of up to `overlap` samples, for crossfade blending.
    #[must_use]
    pub fn tail(&self, overlap: usize) -> &[f32] {
        let start = self.samples.len().saturating_sub(overlap);
        &self.samples[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_zero_fills_on_underrun() {
        let mut buffer = PlaybackBuffer::new();
        buffer.extend(&[1.0, 2.0]);

        let mut out = [9.0; 4];
        let n = buffer.read_into(&mut out);
        assert_eq!(n, 2);
        assert_eq!(out, [1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn cursor_survives_underrun() {
        let mut buffer = PlaybackBuffer::new();
        buffer.extend(&[1.0]);

        let mut out = [0.0; 4];
        buffer.read_into(&mut out);
        assert_eq!(buffer.unread(), 0);

        // Late-arriving audio resumes from where consumption stopped.
        buffer.extend(&[2.0, 3.0]);
        let n = buffer.read_into(&mut out);
        assert_eq!(n, 2);
        assert_eq!(&out[..2], &[2.0, 3.0]);
    }

    #[test]
    fn splice_tail_replaces_overlap_window() {
        let mut buffer = PlaybackBuffer::new();
        buffer.extend(&[1.0, 2.0, 3.0, 4.0]);
        buffer.splice_tail(2, &[30.0, 40.0, 50.0]);

        let mut out = [0.0; 5];
        let n = buffer.read_into(&mut out);
        assert_eq!(n, 5);
        assert_eq!(out, [1.0, 2.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn empty_buffer_reads_all_zeros() {
        let mut buffer = PlaybackBuffer::new();
        let mut out = [7.0; 3];
        assert_eq!(buffer.read_into(&mut out), 0);
        assert_eq!(out, [0.0; 3]);
    }
}

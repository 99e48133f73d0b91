//! Raw sample decoding.
//!
//! The synthesis backend streams bare little-endian IEEE-754 float32 PCM
//! with no framing, so the only decode concern is alignment: a read can end
//! mid-sample when the connection drops or the sentinel lands off-boundary.

/// Width of one sample on the wire (little-endian float32).
pub const SAMPLE_WIDTH: usize = 4;

/// Decode a raw byte stream into f32 samples.
///
/// A tail that is not a whole number of samples is logged and truncated —
/// misalignment is never an error, the largest valid prefix wins.
#[must_use]
pub fn decode_samples(bytes: &[u8]) -> Vec<f32> {
    let remainder = bytes.len() % SAMPLE_WIDTH;
    let aligned = if remainder == 0 {
        bytes
    } else {
        tracing::warn!(
            len = bytes.len(),
            dropped = remainder,
            "received byte count not a multiple of sample width, truncating"
        );
        &bytes[..bytes.len() - remainder]
    };

    aligned
        .chunks_exact(SAMPLE_WIDTH)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

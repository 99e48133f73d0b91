//! WAV encoding for the HTTP façade.
//!
//! The pipeline works in f32 throughout; the façade ships 16-bit PCM WAV
//! because that is what downstream audio players universally accept.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Frames of silence written when there is no audio to encode, so callers
/// always receive a playable WAV rather than an empty body.
const SILENT_FRAMES: usize = 10;

/// Encode mono f32 samples (nominal range [-1.0, 1.0]) as 16-bit PCM WAV.
///
/// Samples are clamped before conversion to avoid integer overflow on
/// out-of-range input. Empty input produces a minimal silent WAV.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        if samples.is_empty() {
            for _ in 0..SILENT_FRAMES {
                writer.write_sample(0i16)?;
            }
        } else {
            for &sample in samples {
                #[allow(clippy::cast_possible_truncation)]
                let quantized = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                writer.write_sample(quantized)?;
            }
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

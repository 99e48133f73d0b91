//! Pipeline configuration.

use std::time::Duration;

/// Configuration for one pipeline run.
///
/// Defaults mirror the F5-TTS backend's conventions: raw mono float32 PCM
/// at 24 kHz over a plain TCP socket, 150 ms crossfade at chunk seams.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Synthesis backend host.
    pub host: String,

    /// Synthesis backend port.
    pub port: u16,

    /// Sample rate of the backend's PCM stream (and of playback).
    pub sample_rate: u32,

    /// Crossfade window at chunk boundaries, in milliseconds.
    pub overlap_ms: u32,

    /// Timeout for establishing a backend connection. Expiry is a hard
    /// failure for that sentence only.
    pub connect_timeout: Duration,

    /// Per-read socket timeout. Expiry with no sentinel seen is treated as
    /// an implicit end of chunk, not an error — the backend does not always
    /// send the sentinel, and the wire format has no framing that would let
    /// the client tell a finished chunk from a slow one.
    pub read_timeout: Duration,

    /// Bounded wait when joining worker threads during shutdown. After
    /// expiry a stuck thread is abandoned and cleanup proceeds.
    pub join_timeout: Duration,

    /// Socket receive buffer size per read, in bytes.
    pub recv_buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9998,
            sample_rate: 24_000,
            overlap_ms: 150,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            join_timeout: Duration::from_secs(10),
            recv_buffer_size: 8192,
        }
    }
}

impl PipelineConfig {
    /// Backend address in `host:port` form.
    #[must_use]
    pub fn backend_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Crossfade window in samples at the configured rate.
    #[must_use]
    pub fn overlap(&self) -> usize {
        voxflow_core::overlap_samples(self.sample_rate, self.overlap_ms)
    }
}

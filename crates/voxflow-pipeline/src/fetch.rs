//! Per-sentence audio fetch over raw TCP.
//!
//! Protocol: connect, send the sentence text as UTF-8, then read little-
//! endian float32 PCM until the backend signals end of stream. End of
//! stream is any of: the 3-byte `END` sentinel, the peer closing the
//! connection, or a read timeout with no sentinel seen (the backend does
//! not always send one).

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use tracing::{debug, warn};

use voxflow_core::decode_samples;

use crate::config::PipelineConfig;
use crate::context::PipelineContext;
use crate::progress::SentencePhase;

/// End-of-stream marker sent by the backend after each sentence's audio.
pub const SENTINEL: &[u8] = b"END";

/// Outcome of one sentence's fetch, sent to the reassembly thread.
///
/// `samples` is `None` on failure or cancellation; the sentence then
/// contributes silence (zero samples) to the assembled stream.
pub struct FetchResult {
    pub index: usize,
    pub samples: Option<Vec<f32>>,
}

/// Fetch worker entry point. Always sends exactly one `FetchResult` for
/// its sentence, whatever happens, so the reassembly thread's accounting
/// stays exact.
pub fn run_worker(
    ctx: &Arc<PipelineContext>,
    index: usize,
    text: String,
    results: &Sender<FetchResult>,
) {
    let samples = if ctx.is_cancelled() {
        ctx.progress.set_phase(index, SentencePhase::Cancelled);
        None
    } else {
        match fetch_chunk(ctx, index, &text) {
            Ok(samples) => {
                ctx.progress.set_phase(index, SentencePhase::Done);
                debug!(sentence = index, samples = samples.len(), "fetch complete");
                Some(samples)
            }
            Err(err) => {
                if ctx.is_cancelled() {
                    ctx.progress.set_phase(index, SentencePhase::Cancelled);
                } else {
                    ctx.progress.set_phase(index, SentencePhase::Error);
                    ctx.mark_fetch_failed();
                    warn!(sentence = index, error = %err, "fetch failed, sentence will be silent");
                }
                None
            }
        }
    };

    ctx.mark_fetch_done();
    // The receiver disappearing just means the run is shutting down.
    let _ = results.send(FetchResult { index, samples });
}

/// Run the wire protocol for one sentence and decode the received bytes.
fn fetch_chunk(
    ctx: &Arc<PipelineContext>,
    index: usize,
    text: &str,
) -> std::io::Result<Vec<f32>> {
    let config = &ctx.config;

    ctx.progress.set_phase(index, SentencePhase::Connecting);
    let addr = config
        .backend_addr()
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| {
            std::io::Error::new(ErrorKind::AddrNotAvailable, "backend address resolved to nothing")
        })?;
    let mut stream = TcpStream::connect_timeout(&addr, config.connect_timeout)?;
    stream.set_read_timeout(Some(config.read_timeout))?;

    let _guard = ctx.connections.register(index, &stream);

    ctx.progress.set_phase(index, SentencePhase::Sending);
    stream.write_all(text.as_bytes())?;

    ctx.progress.set_phase(index, SentencePhase::Receiving);
    let bytes = read_audio(ctx, index, &mut stream)?;
    Ok(decode_samples(&bytes))
}

/// Read audio bytes until end of stream.
///
/// The sentinel is scanned per read call, not across reads: the backend
/// writes it in a single send after the final audio bytes, so it never
/// straddles a read boundary in practice.
fn read_audio(
    ctx: &Arc<PipelineContext>,
    index: usize,
    stream: &mut TcpStream,
) -> std::io::Result<Vec<u8>> {
    let mut audio = Vec::new();
    let mut buf = vec![0u8; ctx.config.recv_buffer_size];

    loop {
        if ctx.is_cancelled() {
            return Err(std::io::Error::new(ErrorKind::Interrupted, "cancelled"));
        }

        match stream.read(&mut buf) {
            Ok(0) => break, // peer closed
            Ok(n) => {
                let received = &buf[..n];
                if let Some(pos) = find_sentinel(received) {
                    audio.extend_from_slice(&received[..pos]);
                    let stray = n - pos - SENTINEL.len();
                    if stray > 0 {
                        debug!(sentence = index, stray, "discarding bytes after end marker");
                    }
                    break;
                }
                audio.extend_from_slice(received);
                ctx.progress.add_bytes(index, n as u64);
            }
            // Timeout without a sentinel: implicit end of chunk.
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                debug!(sentence = index, "read timeout, treating as end of chunk");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(audio)
}

/// Position of the sentinel within one read's bytes, if present.
fn find_sentinel(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(SENTINEL.len())
        .position(|window| window == SENTINEL)
}

// ── offline synthesis (no playback) ──

/// Fetch every sentence of `text` concurrently and return the per-sentence
/// chunks in order, without playing anything. Failed sentences are `None`.
///
/// Used by the HTTP façade, which assembles a complete utterance and ships
/// it as a file instead of streaming it to a device.
#[must_use]
pub fn synthesize(text: &str, config: &PipelineConfig) -> Vec<Option<Vec<f32>>> {
    let sentences = voxflow_core::segment(text);
    let ctx = Arc::new(PipelineContext::new(config.clone(), sentences.len()));

    let (tx, rx) = std::sync::mpsc::channel();
    let workers: Vec<_> = sentences
        .into_iter()
        .map(|sentence| {
            let ctx = Arc::clone(&ctx);
            let tx = tx.clone();
            std::thread::Builder::new()
                .name(format!("voxflow-fetch-{}", sentence.index))
                .spawn(move || run_worker(&ctx, sentence.index, sentence.text, &tx))
        })
        .collect();
    drop(tx);

    let mut chunks: Vec<Option<Vec<f32>>> = vec![None; ctx.total];
    for result in rx {
        if let Some(slot) = chunks.get_mut(result.index) {
            *slot = result.samples;
        }
    }
    for worker in workers.into_iter().flatten() {
        let _ = worker.join();
    }
    chunks
}

/// Check whether the backend accepts connections at all.
#[must_use]
pub fn probe(config: &PipelineConfig) -> bool {
    config
        .backend_addr()
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .is_some_and(|addr| TcpStream::connect_timeout(&addr, config.connect_timeout).is_ok())
}

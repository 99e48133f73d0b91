//! In-order reassembly of concurrently fetched chunks.
//!
//! Workers finish in arbitrary order; playback must be strictly ordered.
//! Results are parked in a pending map until the next expected index
//! arrives, then appended to the playback buffer with a crossfade at each
//! seam. A failed sentence is consumed as silence (zero samples) so the
//! sequence never stalls on it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use tracing::{debug, trace};

use voxflow_core::CrossfadeMixer;

use crate::context::PipelineContext;
use crate::fetch::FetchResult;

/// Poll interval while waiting for worker results, so cancellation is
/// noticed promptly even when no results arrive.
const RECV_POLL: Duration = Duration::from_millis(100);

/// Reassembly thread body. Runs until every sentence is consumed, the
/// run is cancelled, or all workers are gone with nothing left pending.
pub fn run(ctx: &Arc<PipelineContext>, results: &Receiver<FetchResult>) {
    let mixer = CrossfadeMixer::new(ctx.config.overlap());
    let mut pending: BTreeMap<usize, Option<Vec<f32>>> = BTreeMap::new();
    let mut next_expected = 0usize;

    loop {
        if ctx.is_cancelled() {
            debug!("reassembly cancelled");
            return;
        }
        if next_expected >= ctx.total {
            debug!("all sentences consumed");
            return;
        }

        match results.recv_timeout(RECV_POLL) {
            Ok(result) => {
                trace!(sentence = result.index, "result received");
                pending.insert(result.index, result.samples);
                next_expected = drain_ready(ctx, &mixer, &mut pending, next_expected);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // All workers done and their results drained; anything still
                // pending is out of order beyond a gap that can never fill.
                next_expected = drain_ready(ctx, &mixer, &mut pending, next_expected);
                if next_expected < ctx.total {
                    debug!(next_expected, total = ctx.total, "workers gone with gaps left");
                }
                return;
            }
        }
    }
}

/// Consume every contiguous pending result starting at `next_expected`.
/// Returns the new next-expected index.
fn drain_ready(
    ctx: &Arc<PipelineContext>,
    mixer: &CrossfadeMixer,
    pending: &mut BTreeMap<usize, Option<Vec<f32>>>,
    mut next_expected: usize,
) -> usize {
    while let Some(samples) = pending.remove(&next_expected) {
        match samples {
            Some(chunk) if !chunk.is_empty() => append_chunk(ctx, mixer, &chunk),
            // Failure or empty audio: consume as silence.
            _ => trace!(sentence = next_expected, "consumed as silence"),
        }
        ctx.mark_consumed();
        next_expected += 1;
    }
    next_expected
}

/// Crossfade `chunk` onto the tail of the playback buffer.
fn append_chunk(ctx: &Arc<PipelineContext>, mixer: &CrossfadeMixer, chunk: &[f32]) {
    let overlap = mixer.overlap();
    let Ok(mut buffer) = ctx.buffer.lock() else {
        return;
    };

    if overlap == 0 || buffer.len() < overlap || chunk.len() < overlap {
        buffer.extend(chunk);
        return;
    }

    let mut seam = buffer.tail(overlap).to_vec();
    mixer.append(&mut seam, chunk);
    buffer.splice_tail(overlap, &seam);
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use crate::config::PipelineConfig;

    use super::*;

    fn ctx(total: usize, overlap_ms: u32) -> Arc<PipelineContext> {
        let config = PipelineConfig {
            sample_rate: 1000,
            overlap_ms,
            ..PipelineConfig::default()
        };
        Arc::new(PipelineContext::new(config, total))
    }

    fn buffered_samples(ctx: &Arc<PipelineContext>) -> Vec<f32> {
        let unread = ctx.buffer.lock().unwrap().unread();
        let mut out = vec![0.0; unread];
        ctx.buffer.lock().unwrap().read_into(&mut out);
        out
    }

    #[test]
    fn out_of_order_results_play_in_order() {
        let context = ctx(3, 0);
        let (tx, rx) = mpsc::channel();

        // Arrival order 2, 0, 1; distinct constant values per sentence.
        for (index, value) in [(2usize, 3.0f32), (0, 1.0), (1, 2.0)] {
            tx.send(FetchResult {
                index,
                samples: Some(vec![value; 4]),
            })
            .unwrap();
        }
        drop(tx);

        run(&context, &rx);

        assert!(context.all_consumed());
        let samples = buffered_samples(&context);
        assert_eq!(samples.len(), 12);
        assert!(samples[..4].iter().all(|&s| s == 1.0));
        assert!(samples[4..8].iter().all(|&s| s == 2.0));
        assert!(samples[8..].iter().all(|&s| s == 3.0));
    }

    #[test]
    fn failed_sentence_is_consumed_as_silence() {
        let context = ctx(3, 0);
        let (tx, rx) = mpsc::channel();

        tx.send(FetchResult {
            index: 0,
            samples: Some(vec![1.0; 4]),
        })
        .unwrap();
        tx.send(FetchResult {
            index: 1,
            samples: None,
        })
        .unwrap();
        tx.send(FetchResult {
            index: 2,
            samples: Some(vec![3.0; 4]),
        })
        .unwrap();
        drop(tx);

        run(&context, &rx);

        assert!(context.all_consumed());
        // Sentence 1 contributes zero samples, not a pause.
        let samples = buffered_samples(&context);
        assert_eq!(samples.len(), 8);
        assert!(samples[4..].iter().all(|&s| s == 3.0));
    }

    #[test]
    fn crossfade_shortens_each_eligible_seam_by_the_overlap() {
        // overlap = 1000 * 10 / 1000 = 10 samples
        let context = ctx(2, 10);
        let (tx, rx) = mpsc::channel();

        tx.send(FetchResult {
            index: 0,
            samples: Some(vec![0.5; 100]),
        })
        .unwrap();
        tx.send(FetchResult {
            index: 1,
            samples: Some(vec![0.5; 100]),
        })
        .unwrap();
        drop(tx);

        run(&context, &rx);

        let samples = buffered_samples(&context);
        assert_eq!(samples.len(), 190);
        // Equal signals blend to themselves across the seam.
        assert!(samples.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn cancellation_stops_the_loop_without_draining() {
        let context = ctx(2, 0);
        let (tx, rx) = mpsc::channel::<FetchResult>();
        context.cancel();

        let runner = {
            let context = Arc::clone(&context);
            thread::spawn(move || run(&context, &rx))
        };
        runner.join().unwrap();
        drop(tx);

        assert!(!context.all_consumed());
    }

    #[test]
    fn late_chunk_lands_after_consumed_audio() {
        let context = ctx(2, 0);
        let (tx, rx) = mpsc::channel();

        tx.send(FetchResult {
            index: 0,
            samples: Some(vec![1.0; 4]),
        })
        .unwrap();

        let runner = {
            let context = Arc::clone(&context);
            thread::spawn(move || run(&context, &rx))
        };

        // Simulate the audio callback draining everything available, then
        // the straggler arriving.
        thread::sleep(Duration::from_millis(50));
        {
            let mut out = [0.0; 8];
            context.buffer.lock().unwrap().read_into(&mut out);
        }
        tx.send(FetchResult {
            index: 1,
            samples: Some(vec![2.0; 4]),
        })
        .unwrap();
        drop(tx);
        runner.join().unwrap();

        let samples = buffered_samples(&context);
        assert_eq!(samples, vec![2.0; 4]);
    }
}

//! Per-sentence progress reporting.
//!
//! Each fetch worker owns its slot and updates it at every protocol phase
//! transition; presentation code (the CLI's progress bars) takes snapshots.
//! This is observability only — nothing in the pipeline's control flow
//! reads these values.

use std::sync::Mutex;

use serde::Serialize;

/// Protocol phase of one sentence's fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentencePhase {
    /// Worker not started yet.
    Waiting,
    /// Connecting to the backend.
    Connecting,
    /// Sending the sentence text.
    Sending,
    /// Reading audio bytes.
    Receiving,
    /// Finished — audio received (possibly empty).
    Done,
    /// Finished — connection or protocol failure; plays as silence.
    Error,
    /// Aborted by pipeline cancellation.
    Cancelled,
}

impl SentencePhase {
    /// Whether this phase is final for its sentence.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Cancelled)
    }
}

/// Snapshot of one sentence's fetch progress.
#[derive(Debug, Clone, Serialize)]
pub struct SentenceProgress {
    /// Sentence index (playback order).
    pub index: usize,
    /// Current protocol phase.
    pub phase: SentencePhase,
    /// Audio bytes received so far.
    pub bytes_received: u64,
}

/// Fixed-size board of per-sentence progress slots.
pub struct ProgressBoard {
    slots: Vec<Mutex<SentenceProgress>>,
}

impl ProgressBoard {
    /// Create a board with one `Waiting` slot per sentence.
    #[must_use]
    pub fn new(total: usize) -> Self {
        let slots = (0..total)
            .map(|index| {
                Mutex::new(SentenceProgress {
                    index,
                    phase: SentencePhase::Waiting,
                    bytes_received: 0,
                })
            })
            .collect();
        Self { slots }
    }

    /// Record a phase transition for a sentence.
    pub fn set_phase(&self, index: usize, phase: SentencePhase) {
        if let Some(slot) = self.slots.get(index) {
            if let Ok(mut progress) = slot.lock() {
                progress.phase = phase;
            }
        }
    }

    /// Add received bytes to a sentence's running count.
    pub fn add_bytes(&self, index: usize, bytes: u64) {
        if let Some(slot) = self.slots.get(index) {
            if let Ok(mut progress) = slot.lock() {
                progress.bytes_received += bytes;
            }
        }
    }

    /// Snapshot every slot, in sentence order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SentenceProgress> {
        self.slots
            .iter()
            .filter_map(|slot| slot.lock().ok().map(|p| p.clone()))
            .collect()
    }

    /// Number of sentences tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the board tracks no sentences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_waiting_with_zero_bytes() {
        let board = ProgressBoard::new(3);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.iter().all(|p| p.phase == SentencePhase::Waiting));
        assert!(snapshot.iter().all(|p| p.bytes_received == 0));
    }

    #[test]
    fn phase_and_bytes_update_the_right_slot() {
        let board = ProgressBoard::new(2);
        board.set_phase(1, SentencePhase::Receiving);
        board.add_bytes(1, 4096);
        board.add_bytes(1, 1024);

        let snapshot = board.snapshot();
        assert_eq!(snapshot[0].phase, SentencePhase::Waiting);
        assert_eq!(snapshot[1].phase, SentencePhase::Receiving);
        assert_eq!(snapshot[1].bytes_received, 5120);
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let board = ProgressBoard::new(1);
        board.set_phase(7, SentencePhase::Done);
        assert_eq!(board.snapshot().len(), 1);
    }

    #[test]
    fn terminal_phases() {
        assert!(SentencePhase::Done.is_terminal());
        assert!(SentencePhase::Error.is_terminal());
        assert!(SentencePhase::Cancelled.is_terminal());
        assert!(!SentencePhase::Receiving.is_terminal());
    }
}

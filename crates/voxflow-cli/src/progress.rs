//! Terminal progress display: one bar per sentence.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use voxflow_pipeline::{SentencePhase, SentenceProgress};

/// Longest sentence preview shown next to a bar.
const PREVIEW_CHARS: usize = 32;

/// One indicatif spinner per sentence, updated from pipeline snapshots.
pub struct SentenceBars {
    bars: Vec<ProgressBar>,
    // Held so the draw target stays alive as long as the bars do.
    _multi: MultiProgress,
}

impl SentenceBars {
    /// Create one bar per sentence, labelled with a preview of its text.
    #[must_use]
    pub fn new(sentences: &[voxflow_core::Sentence]) -> Self {
        let multi = MultiProgress::new();
        let style = spinner_style("{spinner:.green} {prefix:<36} {msg}");

        let bars = sentences
            .iter()
            .map(|sentence| {
                let bar = multi.add(ProgressBar::new_spinner());
                bar.set_style(style.clone());
                bar.set_prefix(format!(
                    "[{}] {}",
                    sentence.index + 1,
                    preview(&sentence.text)
                ));
                bar.set_message("waiting");
                bar
            })
            .collect();

        Self {
            bars,
            _multi: multi,
        }
    }

    /// Apply a progress snapshot to the bars.
    pub fn update(&self, snapshot: &[SentenceProgress]) {
        for progress in snapshot {
            let Some(bar) = self.bars.get(progress.index) else {
                continue;
            };
            if bar.is_finished() {
                continue;
            }
            match progress.phase {
                SentencePhase::Waiting => bar.set_message("waiting"),
                SentencePhase::Connecting => {
                    bar.set_message("connecting");
                    bar.tick();
                }
                SentencePhase::Sending => {
                    bar.set_message("sending");
                    bar.tick();
                }
                SentencePhase::Receiving => {
                    bar.set_message(format!("receiving ({} bytes)", progress.bytes_received));
                    bar.tick();
                }
                SentencePhase::Done => {
                    bar.set_style(spinner_style("✔ {prefix:<36} {msg:.green}"));
                    bar.finish_with_message(format!("done ({} bytes)", progress.bytes_received));
                }
                SentencePhase::Error => {
                    bar.set_style(spinner_style("✘ {prefix:<36} {msg:.red}"));
                    bar.abandon_with_message("failed (will be silent)");
                }
                SentencePhase::Cancelled => {
                    bar.set_style(spinner_style("- {prefix:<36} {msg:.yellow}"));
                    bar.abandon_with_message("cancelled");
                }
            }
        }
    }

    /// Mark every unfinished bar as cancelled.
    pub fn abandon(&self) {
        for bar in &self.bars {
            if !bar.is_finished() {
                bar.set_style(spinner_style("- {prefix:<36} {msg:.yellow}"));
                bar.abandon_with_message("cancelled");
            }
        }
    }
}

fn spinner_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_spinner().template(template).unwrap()
}

/// First characters of a sentence, ellipsized when cut.
fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_CHARS - 1).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(preview("Hello."), "Hello.");
    }

    #[test]
    fn long_text_is_ellipsized() {
        let text = "a".repeat(100);
        let shown = preview(&text);
        assert_eq!(shown.chars().count(), PREVIEW_CHARS);
        assert!(shown.ends_with('…'));
    }

    #[test]
    fn preview_counts_chars_not_bytes() {
        let text = "ä".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&text), text);
    }
}

//! Sentence segmentation.
//!
//! Splits input text into the ordered sentence units that the rest of the
//! pipeline fetches, reassembles, and plays. A sentence ends at `.`, `?`,
//! or `!` followed by whitespace; the terminal punctuation stays with its
//! sentence.

/// One unit of input text and its stable ordering index.
///
/// The index is the global ordering key used throughout the pipeline:
/// fetch results are tagged with it and playback order is defined by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Position of this sentence in the original text (0-based).
    pub index: usize,
    /// The sentence text, trimmed, including its terminal punctuation.
    pub text: String,
}

/// Lazy iterator over the non-empty sentences of `text`.
///
/// Restartable by calling [`sentences`] again on the same input. Empty or
/// whitespace-only input yields nothing. This is a pure transformation —
/// there are no error conditions.
#[must_use]
pub fn sentences(text: &str) -> Sentences<'_> {
    Sentences { rest: text }
}

/// Split `text` into indexed [`Sentence`]s.
#[must_use]
pub fn segment(text: &str) -> Vec<Sentence> {
    sentences(text)
        .enumerate()
        .map(|(index, text)| Sentence {
            index,
            text: text.to_string(),
        })
        .collect()
}

/// Iterator returned by [`sentences`].
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let trimmed = self.rest.trim_start();
            if trimmed.is_empty() {
                self.rest = "";
                return None;
            }

            match boundary(trimmed) {
                Some(end) => {
                    let (head, tail) = trimmed.split_at(end);
                    self.rest = tail;
                    let head = head.trim_end();
                    if !head.is_empty() {
                        return Some(head);
                    }
                    // Punctuation-only fragment — keep scanning.
                }
                None => {
                    self.rest = "";
                    return Some(trimmed.trim_end());
                }
            }
        }
    }
}

/// Byte offset just past the first sentence boundary in `text`, if any.
///
/// A boundary is terminal punctuation followed by whitespace; the returned
/// offset includes the punctuation but not the whitespace.
fn boundary(text: &str) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '?' | '!') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    return Some(i + c.len_utf8());
                }
            }
        }
    }
    None
}

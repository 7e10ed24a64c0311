//! Corpus ingestion: one sentence per line, tokens split on
//! [`crate::config::TOK_CHARS`] (the input is already tokenized — this
//! crate performs no linguistic tokenization of its own, per the distilled
//! spec's data model; it only strips the token-separator characters a
//! pre-tokenized corpus still carries).
//!
//! Three soft limits are enforced, each with a single diagnostic the first
//! time it triggers rather than one line per offending sentence/word:
//! [`config::MAX_WORD_LEN`], [`config::MAX_SENT_WORDS`], and the caller's
//! `max_sentences` (`--tune-sents`).

use std::io::BufRead;

use crate::config::{MAX_SENT_WORDS, MAX_WORD_LEN, TOK_CHARS};
use crate::displaylevel;
use crate::error::ClusterCatError;

/// Read every non-empty line of `reader` as one sentence, splitting on
/// [`TOK_CHARS`]. Empty lines are ignored entirely (they do not become
/// empty sentences). Stops (without error) after `max_sentences`
/// sentences, warning once that the remainder was dropped.
pub fn read_sentences<R: BufRead>(reader: R, max_sentences: u64) -> Result<Vec<Vec<String>>, ClusterCatError> {
    let mut sentences = Vec::new();
    let mut word_truncated = false;
    let mut sent_truncated = false;
    let mut capacity_warned = false;

    for line in reader.lines() {
        let line = line.map_err(|e| ClusterCatError::VocabInconsistency(format!("I/O error reading corpus: {e}")))?;
        if line.trim().is_empty() {
            continue;
        }

        if sentences.len() as u64 >= max_sentences {
            if !capacity_warned {
                displaylevel!(
                    1,
                    "warning: input exceeds --tune-sents ({max_sentences}); remaining sentences are dropped"
                );
                capacity_warned = true;
            }
            break;
        }

        let mut words: Vec<String> = Vec::new();
        for raw in line.split(TOK_CHARS).filter(|s| !s.is_empty()) {
            let word = if raw.len() > MAX_WORD_LEN {
                if !word_truncated {
                    displaylevel!(1, "warning: word(s) longer than {MAX_WORD_LEN} bytes truncated");
                    word_truncated = true;
                }
                truncate_utf8_lossy(raw, MAX_WORD_LEN)
            } else {
                raw.to_owned()
            };
            words.push(word);
            if words.len() >= MAX_SENT_WORDS {
                if !sent_truncated {
                    displaylevel!(1, "warning: sentence(s) longer than {MAX_SENT_WORDS} words truncated");
                    sent_truncated = true;
                }
                break;
            }
        }
        if words.is_empty() {
            continue;
        }
        sentences.push(words);
    }

    Ok(sentences)
}

/// Truncate `s` to at most `max_bytes` bytes without splitting a UTF-8
/// character in the middle.
fn truncate_utf8_lossy(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_owned();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_owned()
}

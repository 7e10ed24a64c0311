//! Error type for the clustering core.
//!
//! Hand-rolled error enum with manual `Display`/`Error` impls for the
//! algorithmic core, while the CLI glue (`cli`, `main`) works in
//! `anyhow::Result` and converts the final outcome to a process exit code.
//! Every variant here corresponds to exactly one exit code from the
//! configuration table's "Exit codes" section.

use std::fmt;

/// Failure produced by any stage of vocabulary building, corpus ingestion,
/// or exchange clustering.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterCatError {
    /// Unparseable command-line invocation.
    UsageError(String),
    /// A flag was not recognised.
    UnknownFlag(String),
    /// `num_classes` was not less than the (post-filter) vocabulary size.
    NumClassesNotLessThanVocab { num_classes: u32, vocab_size: u32 },
    /// Internal vocabulary bookkeeping is inconsistent (e.g. duplicate ids).
    VocabInconsistency(String),
    /// A hypothetical class count dropped below its word count.
    ClassCountBelowWordCount { class: u32, class_count: u64, word_count: u64 },
    /// A transition probability exceeded 1.0.
    TransitionProbabilityTooLarge(f64),
    /// The sentence buffer could not be allocated.
    SentenceBufferAllocation { requested_sentences: u64 },
    /// The integer corpus could not be allocated.
    IdCorpusAllocation { requested_sentences: u64 },
    /// `max_array` was outside the valid `1..=3` range.
    MaxArrayOutOfRange(u8),
    /// A class emission/transition probability fell outside `[0, 1]`.
    ClassProbabilityOutOfRange(f64),
    /// A dense count array could not be allocated.
    CountArrayAllocation { order: u8, num_classes: u32 },
    /// The word-by-class co-occurrence matrix could not be allocated.
    MatrixAllocation { vocab_size: u32, num_classes: u32 },
}

impl ClusterCatError {
    /// The process exit code this failure should surface as, matching the
    /// configuration table's "Exit codes" section exactly.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClusterCatError::UsageError(_) => 1,
            ClusterCatError::UnknownFlag(_) => 2,
            ClusterCatError::NumClassesNotLessThanVocab { .. } => 3,
            ClusterCatError::VocabInconsistency(_) => 4,
            ClusterCatError::ClassCountBelowWordCount { .. } => 5,
            ClusterCatError::TransitionProbabilityTooLarge(_) => 6,
            ClusterCatError::SentenceBufferAllocation { .. } => 7,
            ClusterCatError::IdCorpusAllocation { .. } => 8,
            ClusterCatError::MaxArrayOutOfRange(_) => 10,
            ClusterCatError::ClassProbabilityOutOfRange(_) => 11,
            ClusterCatError::CountArrayAllocation { .. } => 12,
            ClusterCatError::MatrixAllocation { .. } => 13,
        }
    }
}

impl fmt::Display for ClusterCatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterCatError::UsageError(msg) => write!(f, "bad usage: {msg}"),
            ClusterCatError::UnknownFlag(flag) => write!(f, "unknown command-line argument: {flag}"),
            ClusterCatError::NumClassesNotLessThanVocab { num_classes, vocab_size } => write!(
                f,
                "number of classes ({num_classes}) is not less than vocabulary size ({vocab_size}); decrease --num-classes"
            ),
            ClusterCatError::VocabInconsistency(msg) => write!(f, "internal vocabulary inconsistency: {msg}"),
            ClusterCatError::ClassCountBelowWordCount { class, class_count, word_count } => write!(
                f,
                "class_{class}_count={class_count} < word_count={word_count}"
            ),
            ClusterCatError::TransitionProbabilityTooLarge(p) => write!(f, "transition probability {p} > 1"),
            ClusterCatError::SentenceBufferAllocation { requested_sentences } => write!(
                f,
                "unable to allocate sentence buffer for {requested_sentences} sentences; reduce --tune-sents"
            ),
            ClusterCatError::IdCorpusAllocation { requested_sentences } => write!(
                f,
                "unable to allocate integer corpus for {requested_sentences} sentences"
            ),
            ClusterCatError::MaxArrayOutOfRange(value) => write!(f, "--max-array value {value} should be between 1-3"),
            ClusterCatError::ClassProbabilityOutOfRange(p) => write!(f, "class probability {p} is not within [0,1]"),
            ClusterCatError::CountArrayAllocation { order, num_classes } => write!(
                f,
                "unable to allocate {order}-gram count array ({num_classes}^{order} entries); reduce --num-classes"
            ),
            ClusterCatError::MatrixAllocation { vocab_size, num_classes } => write!(
                f,
                "unable to allocate {vocab_size}x{num_classes} word-class matrix; reduce --num-classes or --min-count"
            ),
        }
    }
}

impl std::error::Error for ClusterCatError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_table() {
        assert_eq!(ClusterCatError::UsageError("x".into()).exit_code(), 1);
        assert_eq!(ClusterCatError::UnknownFlag("--bogus".into()).exit_code(), 2);
        assert_eq!(
            ClusterCatError::NumClassesNotLessThanVocab { num_classes: 10, vocab_size: 5 }.exit_code(),
            3
        );
        assert_eq!(ClusterCatError::MaxArrayOutOfRange(5).exit_code(), 10);
        assert_eq!(ClusterCatError::ClassProbabilityOutOfRange(1.5).exit_code(), 11);
        assert_eq!(
            ClusterCatError::CountArrayAllocation { order: 3, num_classes: 5000 }.exit_code(),
            12
        );
        assert_eq!(
            ClusterCatError::MatrixAllocation { vocab_size: 100, num_classes: 5000 }.exit_code(),
            13
        );
    }

    #[test]
    fn display_messages_are_human_readable() {
        let e = ClusterCatError::MaxArrayOutOfRange(7);
        assert!(e.to_string().contains("between 1-3"));
    }
}

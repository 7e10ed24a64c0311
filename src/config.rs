// config.rs — Compile-time configuration constants for predictive-exchange
// word class induction.

/// Fixed set of token-separator characters: ASCII whitespace plus the
/// common punctuation-spacers an already-tokenized corpus still glues to
/// neighboring words (quotes, brackets, and sentence-final punctuation).
/// Mirrors the reference tool's `strtok` delimiter set.
pub const TOK_CHARS: &[char] = &[
    ' ', '\t', '\r', '\n', '\x0b', '\x0c', ',', ';', ':', '!', '?', '"', '\'', '(', ')', '[', ']', '{', '}',
];

/// Maximum length, in bytes, a single word is truncated to before being
/// entered into the vocabulary. Longer words are truncated with a single
/// diagnostic (see [`crate::io::reader`]).
pub const MAX_WORD_LEN: usize = 64;

/// Maximum number of words (including `<s>`/`</s>`) kept per sentence.
/// Longer sentences are truncated with a single diagnostic.
pub const MAX_SENT_WORDS: usize = 256;

/// Default number of worker threads used by the exchange driver.
pub const NUM_THREADS_DEFAULT: usize = 4;

/// Default minimum token count for a word to survive vocabulary filtering.
pub const MIN_COUNT_DEFAULT: u64 = 3;

/// Default highest class-n-gram order stored densely (unigram..trigram).
pub const MAX_ARRAY_DEFAULT: u8 = 3;
/// Valid range for `max_array`, inclusive.
pub const MAX_ARRAY_RANGE: (u8, u8) = (1, 3);

/// Default sentence-store capacity.
pub const MAX_TUNE_SENTS_DEFAULT: u64 = 10_000_000;

/// Default hard bound on exchange cycles.
pub const TUNE_CYCLES_DEFAULT: u16 = 15;

/// Default reverse-direction alternation frequency (0 = never alternate).
pub const REV_ALTERNATE_DEFAULT: u8 = 3;

/// Default amount added to every emitted class id.
pub const CLASS_OFFSET_DEFAULT: i32 = 0;

/// Class-trigram interpolation weights, in position order
/// `[w(-2), w(-1), w(0) unigram, w(+1), w(+2)]`.
///
/// The unigram weight (index 2) is always active; `unidirectional` mode
/// zeroes indices 3 and 4 (see [`crate::scoring`]).
pub const INTERPOLATION_WEIGHTS: [f64; 5] = [0.40, 0.16, 0.01, 0.10, 0.33];

/// Soft cap on the number of counts (`K^n`) a single count-array order may
/// hold before allocation is refused. Keeps a pathological `--num-classes`
/// from silently attempting a many-gigabyte allocation.
pub const COUNT_ARRAY_MAX_ENTRIES: u64 = 1 << 30;

//! Vocabulary: the finite `string -> word_id` mapping built from raw
//! tokenized sentences, with unigram counts and minimum-count filtering.
//!
//! Implements §4.3 of the word class induction design (build + filter).

use std::collections::HashMap;

/// The reserved unknown-word token. Always word id 0.
pub const UNK: &str = "<unk>";
/// The reserved sentence-start token. Always word id 1.
pub const BOS: &str = "<s>";
/// The reserved sentence-end token. Always word id 2.
pub const EOS: &str = "</s>";

pub const UNK_ID: u32 = 0;
pub const BOS_ID: u32 = 1;
pub const EOS_ID: u32 = 2;

/// Finite `word -> word_id` mapping with dense ids and unigram counts.
///
/// Ids 0..2 are always `<unk>`, `<s>`, `</s>` respectively. Remaining ids
/// are assigned densely in descending-count order so that, for `id >= 3`,
/// `id < id'` implies `count(id) >= count(id')`. Immutable after
/// [`Vocabulary::build`].
#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<String>,
    counts: Vec<u64>,
    index: HashMap<String, u32>,
}

impl Vocabulary {
    /// Build a vocabulary from raw tokenized sentences (content tokens only
    /// — boundary tokens are accounted for internally, one `<s>`/`</s>`
    /// pair per sentence, and must not be passed in `sentences`).
    ///
    /// Words whose total count is strictly less than `min_count` are folded
    /// into `<unk>` (never `<unk>` itself). Surviving words are assigned
    /// dense ids in descending-count order after the reserved ids 0..2.
    pub fn build<S: AsRef<str>>(sentences: &[Vec<S>], min_count: u64) -> Vocabulary {
        let mut raw_counts: HashMap<String, u64> = HashMap::new();
        raw_counts.insert(UNK.to_string(), 0);
        let mut bos_eos_count = 0u64;
        for sent in sentences {
            bos_eos_count += 1;
            for tok in sent {
                *raw_counts.entry(tok.as_ref().to_string()).or_insert(0) += 1;
            }
        }
        raw_counts.insert(BOS.to_string(), bos_eos_count);
        raw_counts.insert(EOS.to_string(), bos_eos_count);

        // Filter: anything below min_count (except <unk>, <s>, </s>) folds
        // its count into <unk> and is dropped from the surviving set. The
        // reserved boundary tokens are exempt from the filter entirely —
        // they are structural, not vocabulary, and must be counted once per
        // sentence regardless of min_count (distilled §3 "Word counts").
        let mut unk_count = *raw_counts.get(UNK).unwrap();
        let mut survivors: Vec<(String, u64)> = Vec::with_capacity(raw_counts.len());
        for (word, count) in raw_counts.into_iter() {
            if word == UNK {
                continue;
            }
            if (word == BOS || word == EOS) || count >= min_count {
                survivors.push((word, count));
            } else {
                unk_count += count;
            }
        }

        // Stable sort by descending count; ties keep a deterministic order
        // by falling back to lexicographic word order (HashMap iteration
        // order is otherwise unspecified and would make ties nondeterministic).
        survivors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut words = Vec::with_capacity(survivors.len() + 3);
        let mut counts = Vec::with_capacity(survivors.len() + 3);
        words.push(UNK.to_string());
        counts.push(unk_count);
        words.push(BOS.to_string());
        counts.push(0); // filled in below
        words.push(EOS.to_string());
        counts.push(0);

        let mut bos_count = 0u64;
        let mut eos_count = 0u64;
        for (word, count) in survivors {
            if word == BOS {
                bos_count = count;
                continue;
            }
            if word == EOS {
                eos_count = count;
                continue;
            }
            words.push(word);
            counts.push(count);
        }
        counts[BOS_ID as usize] = bos_count;
        counts[EOS_ID as usize] = eos_count;

        let mut index = HashMap::with_capacity(words.len());
        for (id, word) in words.iter().enumerate() {
            index.insert(word.clone(), id as u32);
        }

        Vocabulary { words, counts, index }
    }

    /// Number of distinct words, including the three reserved tokens.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Look up a word's id, falling back to [`UNK_ID`] if unseen.
    pub fn id_or_unk(&self, word: &str) -> u32 {
        self.index.get(word).copied().unwrap_or(UNK_ID)
    }

    /// Look up a word's id without falling back.
    pub fn id(&self, word: &str) -> Option<u32> {
        self.index.get(word).copied()
    }

    pub fn word(&self, id: u32) -> &str {
        &self.words[id as usize]
    }

    pub fn count(&self, id: u32) -> u64 {
        self.counts[id as usize]
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

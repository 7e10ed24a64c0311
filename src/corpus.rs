//! Integer-compact corpus representation.
//!
//! Each sentence is stored as an ordered sequence of word ids bracketed by
//! `<s>` / `</s>`, flattened into one array with per-sentence lengths kept
//! separately (§3 "Integer corpus").

use crate::vocab::{Vocabulary, BOS_ID, EOS_ID};

/// Immutable, flattened integer corpus.
///
/// `sentence(i)` is `ids[offsets[i]..offsets[i]+lengths[i]]`. `offsets` is a
/// derived cache (prefix sum of `lengths`), not separately mutable state.
#[derive(Debug, Clone)]
pub struct Corpus {
    ids: Vec<u32>,
    lengths: Vec<u32>,
    offsets: Vec<u32>,
}

impl Corpus {
    /// Re-map raw tokenized sentences (content tokens only) to id form,
    /// inserting `<s>`/`</s>` at the boundaries of every sentence. Unknown
    /// words fall back to `<unk>`.
    pub fn build<S: AsRef<str>>(vocab: &Vocabulary, sentences: &[Vec<S>]) -> Corpus {
        let mut ids = Vec::new();
        let mut lengths = Vec::with_capacity(sentences.len());
        let mut offsets = Vec::with_capacity(sentences.len());
        for sent in sentences {
            offsets.push(ids.len() as u32);
            ids.push(BOS_ID);
            for tok in sent {
                ids.push(vocab.id_or_unk(tok.as_ref()));
            }
            ids.push(EOS_ID);
            lengths.push((sent.len() + 2) as u32);
        }
        Corpus { ids, lengths, offsets }
    }

    pub fn num_sentences(&self) -> usize {
        self.lengths.len()
    }

    pub fn sentence(&self, i: usize) -> &[u32] {
        let start = self.offsets[i] as usize;
        let len = self.lengths[i] as usize;
        &self.ids[start..start + len]
    }

    pub fn sentences(&self) -> impl Iterator<Item = &[u32]> {
        (0..self.num_sentences()).map(move |i| self.sentence(i))
    }

    pub fn total_tokens(&self) -> u64 {
        self.lengths.iter().map(|&l| l as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Vocabulary;

    #[test]
    fn bracket_with_boundaries() {
        let sents: Vec<Vec<&str>> = vec![vec!["a", "b"]];
        let vocab = Vocabulary::build(&sents, 1);
        let corpus = Corpus::build(&vocab, &sents);
        let s = corpus.sentence(0);
        assert_eq!(s.len(), 4);
        assert_eq!(s[0], BOS_ID);
        assert_eq!(s[3], EOS_ID);
        assert_eq!(s[1], vocab.id("a").unwrap());
        assert_eq!(s[2], vocab.id("b").unwrap());
    }

    #[test]
    fn unknown_words_fall_back_to_unk() {
        let sents: Vec<Vec<&str>> = vec![vec!["a"], vec!["a"], vec!["a"]];
        let vocab = Vocabulary::build(&sents, 2);
        let query: Vec<Vec<&str>> = vec![vec!["a", "zzz"]];
        let corpus = Corpus::build(&vocab, &query);
        let s = corpus.sentence(0);
        assert_eq!(s[1], vocab.id("a").unwrap());
        assert_eq!(s[2], crate::vocab::UNK_ID);
    }

    #[test]
    fn multiple_sentences_are_independently_addressable() {
        let sents: Vec<Vec<&str>> = vec![vec!["a", "b"], vec!["b", "a", "a"]];
        let vocab = Vocabulary::build(&sents, 1);
        let corpus = Corpus::build(&vocab, &sents);
        assert_eq!(corpus.num_sentences(), 2);
        assert_eq!(corpus.sentence(0).len(), 4);
        assert_eq!(corpus.sentence(1).len(), 5);
        assert_eq!(corpus.total_tokens(), 9);
    }
}

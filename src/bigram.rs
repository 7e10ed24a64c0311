//! Bigram predecessor lists (§4.4 of the word class induction design).
//!
//! For each word `w`, the sorted list of `(u, count)` pairs such that the
//! bigram `u w` occurred in the corpus. The reverse list is built the same
//! way from the reversed bigram `(w[i], w[i-1])`, which makes it, in effect,
//! a *successor* list: `reverse_list(w)` holds the words that immediately
//! follow `w`, with their counts.

use std::collections::HashMap;

use crate::corpus::Corpus;

/// A predecessor (or, in reverse mode, successor) listing over the whole
/// vocabulary. Built once from the immutable corpus; read-only afterwards.
#[derive(Debug, Clone)]
pub struct BigramList {
    neighbors: Vec<Vec<u32>>,
    counts: Vec<Vec<u64>>,
}

impl BigramList {
    /// Build the forward (`reverse = false`) or reverse (`reverse = true`)
    /// listing by a single pass over the corpus followed by a group-by.
    ///
    /// Deterministic: entries for a given word are sorted by neighbor id.
    pub fn build(corpus: &Corpus, vocab_size: u32, reverse: bool) -> BigramList {
        // (group, neighbor) -> count. `group` is the word the list is
        // indexed by; `neighbor` is the entry stored under that group.
        let mut pair_counts: HashMap<(u32, u32), u64> = HashMap::new();
        for sent in corpus.sentences() {
            for i in 1..sent.len() {
                let (group, neighbor) = if reverse {
                    (sent[i - 1], sent[i])
                } else {
                    (sent[i], sent[i - 1])
                };
                *pair_counts.entry((group, neighbor)).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<((u32, u32), u64)> = pair_counts.into_iter().collect();
        entries.sort_by_key(|&((g, n), _)| (g, n));

        let mut neighbors = vec![Vec::new(); vocab_size as usize];
        let mut counts = vec![Vec::new(); vocab_size as usize];
        for ((group, neighbor), count) in entries {
            neighbors[group as usize].push(neighbor);
            counts[group as usize].push(count);
        }

        BigramList { neighbors, counts }
    }

    /// The `(neighbor_id, count)` pairs for `word`, sorted by neighbor id.
    pub fn neighbors(&self, word: u32) -> (&[u32], &[u64]) {
        (&self.neighbors[word as usize], &self.counts[word as usize])
    }

    /// Total count summed across all of `word`'s neighbors — equals the
    /// number of corpus positions at which `word` occurs with a
    /// predecessor (forward) or successor (reverse).
    pub fn total_count(&self, word: u32) -> u64 {
        self.counts[word as usize].iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Vocabulary;

    fn build_corpus(sents: &[Vec<&str>]) -> (Vocabulary, Corpus) {
        let vocab = Vocabulary::build(sents, 1);
        let corpus = Corpus::build(&vocab, sents);
        (vocab, corpus)
    }

    #[test]
    fn forward_list_groups_predecessors() {
        let sents: Vec<Vec<&str>> = vec![vec!["a", "b", "a", "b"]];
        let (vocab, corpus) = build_corpus(&sents);
        let fwd = BigramList::build(&corpus, vocab.len() as u32, false);
        let a = vocab.id("a").unwrap();
        let b = vocab.id("b").unwrap();
        // "a" is preceded by <s> and "b".
        let (preds, counts) = fwd.neighbors(a);
        assert_eq!(preds.len(), 2);
        let total: u64 = counts.iter().sum();
        assert_eq!(total, 2);
        // "b" is preceded by "a" twice.
        let (preds_b, counts_b) = fwd.neighbors(b);
        assert_eq!(preds_b, &[a]);
        assert_eq!(counts_b, &[2]);
    }

    #[test]
    fn reverse_list_groups_successors() {
        let sents: Vec<Vec<&str>> = vec![vec!["a", "b", "a", "b"]];
        let (vocab, corpus) = build_corpus(&sents);
        let rev = BigramList::build(&corpus, vocab.len() as u32, true);
        let a = vocab.id("a").unwrap();
        let b = vocab.id("b").unwrap();
        // "a" is followed by "b" twice.
        let (succs_a, counts_a) = rev.neighbors(a);
        assert_eq!(succs_a, &[b]);
        assert_eq!(counts_a, &[2]);
    }

    #[test]
    fn neighbor_lists_are_sorted_by_id() {
        let sents: Vec<Vec<&str>> = vec![vec!["c", "a", "a", "a", "b", "a"]];
        let (vocab, corpus) = build_corpus(&sents);
        let fwd = BigramList::build(&corpus, vocab.len() as u32, false);
        let a = vocab.id("a").unwrap();
        let (preds, _) = fwd.neighbors(a);
        let mut sorted = preds.to_vec();
        sorted.sort_unstable();
        assert_eq!(preds, sorted.as_slice());
    }

    #[test]
    fn palindromic_corpus_forward_reverse_are_transposes() {
        // Every sentence equal to its own reverse.
        let sents: Vec<Vec<&str>> = vec![vec!["a", "b", "a"], vec!["x"]];
        let (vocab, corpus) = build_corpus(&sents);
        let fwd = BigramList::build(&corpus, vocab.len() as u32, false);
        let rev = BigramList::build(&corpus, vocab.len() as u32, true);
        // For a palindromic corpus, fwd(w) as a multiset of (neighbor,count)
        // equals rev(w): predecessors of w are the same as successors of w.
        for id in 0..vocab.len() as u32 {
            let (fn_, fc) = fwd.neighbors(id);
            let (rn, rc) = rev.neighbors(id);
            let mut f_pairs: Vec<(u32, u64)> = fn_.iter().copied().zip(fc.iter().copied()).collect();
            let mut r_pairs: Vec<(u32, u64)> = rn.iter().copied().zip(rc.iter().copied()).collect();
            f_pairs.sort();
            r_pairs.sort();
            assert_eq!(f_pairs, r_pairs, "mismatch for word {id}");
        }
    }
}

//! Dense word x class co-occurrence matrix (§4.5).
//!
//! `matrix[w][k]` is the number of corpus positions at which word `w` has a
//! predecessor (forward matrix) or successor (reverse matrix) currently
//! assigned to class `k`. Maintained incrementally by [`ClassMatrix::apply_move`]
//! rather than rebuilt from scratch on every exchange.

use crate::bigram::BigramList;
use crate::corpus::Corpus;
use crate::error::ClusterCatError;

/// One direction (forward or reverse) of the word x class matrix.
#[derive(Debug, Clone)]
pub struct ClassMatrix {
    data: Vec<u64>,
    vocab_size: u32,
    num_classes: u32,
}

impl ClassMatrix {
    /// Allocate a zeroed `vocab_size x num_classes` matrix.
    pub fn allocate(vocab_size: u32, num_classes: u32) -> Result<Self, ClusterCatError> {
        let len = (vocab_size as u64)
            .checked_mul(num_classes as u64)
            .filter(|&n| n <= crate::config::COUNT_ARRAY_MAX_ENTRIES)
            .ok_or(ClusterCatError::MatrixAllocation { vocab_size, num_classes })?;
        Ok(ClassMatrix { data: vec![0u64; len as usize], vocab_size, num_classes })
    }

    #[inline]
    fn index(&self, word: u32, class: u32) -> usize {
        word as usize * self.num_classes as usize + class as usize
    }

    #[inline]
    pub fn get(&self, word: u32, class: u32) -> u64 {
        self.data[self.index(word, class)]
    }

    #[inline]
    fn add(&mut self, word: u32, class: u32, delta: u64) {
        let idx = self.index(word, class);
        self.data[idx] += delta;
    }

    #[inline]
    fn sub(&mut self, word: u32, class: u32, delta: u64) {
        let idx = self.index(word, class);
        debug_assert!(self.data[idx] >= delta);
        self.data[idx] -= delta;
    }

    /// Build the matrix from a corpus pass: forward counts predecessor
    /// classes per word, reverse counts successor classes.
    pub fn build(
        corpus: &Corpus,
        vocab_size: u32,
        num_classes: u32,
        assignment: &[u32],
        reverse: bool,
    ) -> Result<Self, ClusterCatError> {
        let mut matrix = ClassMatrix::allocate(vocab_size, num_classes)?;
        for sent in corpus.sentences() {
            for i in 1..sent.len() {
                let (row, context) = if reverse { (sent[i], sent[i - 1]) } else { (sent[i - 1], sent[i]) };
                matrix.add(row, assignment[context as usize], 1);
            }
        }
        Ok(matrix)
    }

    /// Apply a class reassignment of `word` from `old_class` to `new_class`:
    /// for every neighbor `u` of `word` in `list` (predecessors for the
    /// forward matrix, successors for the reverse matrix), move `u`'s count
    /// under `old_class` to `new_class`.
    pub fn apply_move(&mut self, word: u32, old_class: u32, new_class: u32, list: &BigramList) {
        let (neighbors, counts) = list.neighbors(word);
        for (&u, &c) in neighbors.iter().zip(counts.iter()) {
            self.sub(u, old_class, c);
            self.add(u, new_class, c);
        }
    }

    pub fn vocab_size(&self) -> u32 {
        self.vocab_size
    }

    pub fn num_classes(&self) -> u32 {
        self.num_classes
    }

    /// Sum of an entire row — the number of positions `word` occurs in this
    /// direction's role, invariant across any sequence of moves.
    pub fn row_total(&self, word: u32) -> u64 {
        let start = self.index(word, 0);
        self.data[start..start + self.num_classes as usize].iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Vocabulary;

    fn setup() -> (Vocabulary, Corpus) {
        let sents: Vec<Vec<&str>> = vec![vec!["a", "b", "a", "b", "c"]];
        let vocab = Vocabulary::build(&sents, 1);
        let corpus = Corpus::build(&vocab, &sents);
        (vocab, corpus)
    }

    #[test]
    fn row_totals_match_bigram_list_totals() {
        let (vocab, corpus) = setup();
        let k = 2;
        let assignment = vec![0u32; vocab.len()];
        let matrix = ClassMatrix::build(&corpus, vocab.len() as u32, k, &assignment, false).unwrap();
        let fwd = BigramList::build(&corpus, vocab.len() as u32, false);
        for id in 0..vocab.len() as u32 {
            assert_eq!(matrix.row_total(id), fwd.total_count(id));
        }
    }

    #[test]
    fn apply_move_conserves_row_total() {
        let (vocab, corpus) = setup();
        let k = 3;
        let mut assignment: Vec<u32> = (0..vocab.len() as u32).map(|i| i % k).collect();
        let mut matrix = ClassMatrix::build(&corpus, vocab.len() as u32, k, &assignment, false).unwrap();
        let fwd = BigramList::build(&corpus, vocab.len() as u32, false);
        let a = vocab.id("a").unwrap();
        let before: u64 = (0..k).map(|c| matrix.get(0, c)).sum::<u64>()
            + (0..k).map(|c| matrix.get(a, c)).sum::<u64>();
        let old_class = assignment[a as usize];
        let new_class = (old_class + 1) % k;
        matrix.apply_move(a, old_class, new_class, &fwd);
        assignment[a as usize] = new_class;
        let after: u64 = (0..k).map(|c| matrix.get(0, c)).sum::<u64>()
            + (0..k).map(|c| matrix.get(a, c)).sum::<u64>();
        assert_eq!(before, after);
    }

    #[test]
    fn apply_move_moves_exact_counts() {
        let (vocab, corpus) = setup();
        let k = 2;
        let assignment = vec![0u32; vocab.len()];
        let mut matrix = ClassMatrix::build(&corpus, vocab.len() as u32, k, &assignment, false).unwrap();
        let fwd = BigramList::build(&corpus, vocab.len() as u32, false);
        let b = vocab.id("b").unwrap();
        let moved = matrix.get(b, 0);
        matrix.apply_move(b, 0, 1, &fwd);
        assert_eq!(matrix.get(b, 0), 0);
        assert_eq!(matrix.get(b, 1), moved);
    }
}

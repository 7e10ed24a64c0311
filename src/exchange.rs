//! The predictive-exchange driver (§4.7): round-robin initialization, the
//! per-cycle scoring/selecting/applying/reporting state machine, direction
//! alternation, and early termination on a no-op cycle.
//!
//! "Apply move" is the single place the count arrays, the word x class
//! matrices, and the class assignment are mutated — every other part of the
//! driver only reads them.

use rayon::prelude::*;

use crate::bigram::BigramList;
use crate::config;
use crate::corpus::Corpus;
use crate::counts::CountArrays;
use crate::displaylevel;
use crate::error::ClusterCatError;
use crate::matrix::ClassMatrix;
use crate::scoring::{self, Weights};
use crate::vocab::Vocabulary;

/// Tunable knobs the driver needs beyond what [`CountArrays`]/[`ClassMatrix`]
/// already carry (num_classes, max_array).
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub weights: Weights,
    pub unidirectional: bool,
    pub rev_alternate: u8,
    pub tune_cycles: u16,
    pub class_offset: i32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            weights: config::INTERPOLATION_WEIGHTS,
            unidirectional: false,
            rev_alternate: config::REV_ALTERNATE_DEFAULT,
            tune_cycles: config::TUNE_CYCLES_DEFAULT,
            class_offset: config::CLASS_OFFSET_DEFAULT,
        }
    }
}

/// Outcome of a full run: the final assignment plus a per-cycle move count,
/// useful for reporting and for the "did anything move" termination check.
#[derive(Debug, Clone)]
pub struct ExchangeReport {
    pub cycles_run: u16,
    pub moves_per_cycle: Vec<u32>,
}

/// All mutable and immutable state the exchange driver operates on.
pub struct ExchangeModel<'a> {
    vocab: &'a Vocabulary,
    corpus: &'a Corpus,
    num_classes: u32,
    cfg: ExchangeConfig,
    assignment: Vec<u32>,
    arrays: CountArrays,
    bigram_fwd: BigramList,
    bigram_rev: Option<BigramList>,
    matrix_fwd: ClassMatrix,
    matrix_rev: Option<ClassMatrix>,
    occurrences: Vec<Vec<(u32, u32)>>,
}

/// The first content word id; `<unk>`/`<s>`/`</s>` are never exchanged (they
/// mark structural positions, not clusterable vocabulary).
const FIRST_CONTENT_WORD: u32 = 3;

impl<'a> ExchangeModel<'a> {
    /// Build the initial model: round-robin class assignment, dense count
    /// arrays, predecessor/successor lists, and word x class matrices.
    pub fn build(
        vocab: &'a Vocabulary,
        corpus: &'a Corpus,
        num_classes: u32,
        max_array: u8,
        cfg: ExchangeConfig,
    ) -> Result<Self, ClusterCatError> {
        if num_classes >= vocab.len() as u32 {
            return Err(ClusterCatError::NumClassesNotLessThanVocab {
                num_classes,
                vocab_size: vocab.len() as u32,
            });
        }
        if !(config::MAX_ARRAY_RANGE.0..=config::MAX_ARRAY_RANGE.1).contains(&max_array) {
            return Err(ClusterCatError::MaxArrayOutOfRange(max_array));
        }

        let assignment = init_round_robin(vocab.len() as u32, num_classes);
        let vocab_size = vocab.len() as u32;

        let bigram_fwd = BigramList::build(corpus, vocab_size, false);
        let bigram_rev = if cfg.unidirectional { None } else { Some(BigramList::build(corpus, vocab_size, true)) };

        let matrix_fwd = ClassMatrix::build(corpus, vocab_size, num_classes, &assignment, false)?;
        let matrix_rev = if cfg.unidirectional {
            None
        } else {
            Some(ClassMatrix::build(corpus, vocab_size, num_classes, &assignment, true)?)
        };

        let mut arrays = CountArrays::allocate(max_array, num_classes)?;
        fill_count_arrays(&mut arrays, corpus, &assignment, max_array);

        let occurrences = scoring::build_occurrence_index(corpus, vocab_size);

        Ok(ExchangeModel {
            vocab,
            corpus,
            num_classes,
            cfg,
            assignment,
            arrays,
            bigram_fwd,
            bigram_rev,
            matrix_fwd,
            matrix_rev,
            occurrences,
        })
    }

    pub fn assignment(&self) -> &[u32] {
        &self.assignment
    }

    /// Overwrite the current class assignment wholesale (used to apply a
    /// `--class-file` import before the first cycle runs). The caller is
    /// responsible for providing a value of the same length built from
    /// [`init_round_robin`] or a prior assignment; this does not rebuild the
    /// count arrays or matrices, so it must only be called before [`run`](Self::run).
    pub fn set_assignment(&mut self, assignment: Vec<u32>) {
        debug_assert_eq!(assignment.len(), self.assignment.len());
        self.assignment = assignment;
        self.arrays.clear();
        fill_count_arrays(&mut self.arrays, self.corpus, &self.assignment, self.arrays.max_array());
        self.matrix_fwd = ClassMatrix::build(self.corpus, self.vocab.len() as u32, self.num_classes, &self.assignment, false)
            .expect("rebuilding the forward matrix at an already-validated size cannot fail");
        if self.matrix_rev.is_some() {
            self.matrix_rev = Some(
                ClassMatrix::build(self.corpus, self.vocab.len() as u32, self.num_classes, &self.assignment, true)
                    .expect("rebuilding the reverse matrix at an already-validated size cannot fail"),
            );
        }
    }

    /// The forward (predecessor-class) word x class matrix, for word-vector
    /// export.
    pub fn forward_matrix(&self) -> &ClassMatrix {
        &self.matrix_fwd
    }

    /// Run the exchange to convergence or `tune_cycles`, whichever comes
    /// first. Stops immediately after a cycle makes zero moves.
    pub fn run(&mut self) -> Result<ExchangeReport, ClusterCatError> {
        let mut moves_per_cycle = Vec::new();
        let verbose_checks = crate::cli::constants::display_level() >= 3;

        let mut cycle = 0u16;
        while cycle < self.cfg.tune_cycles {
            let reverse_this_cycle = self.direction_for_cycle(cycle);
            let moved = self.run_cycle(reverse_this_cycle)?;
            displaylevel!(2, "cycle {}: {} word(s) moved (direction={})", cycle, moved, if reverse_this_cycle { "reverse" } else { "forward" });
            moves_per_cycle.push(moved);
            cycle += 1;

            if verbose_checks {
                self.check_invariants()?;
            }

            if moved == 0 {
                break;
            }
        }

        Ok(ExchangeReport { cycles_run: cycle, moves_per_cycle })
    }

    /// Whether this cycle should score using the reverse (successor)
    /// direction's neighbor lists, per `rev_alternate`. `rev_alternate == 0`
    /// means never alternate (always forward).
    fn direction_for_cycle(&self, cycle: u16) -> bool {
        if self.cfg.unidirectional || self.cfg.rev_alternate == 0 {
            return false;
        }
        (cycle / self.cfg.rev_alternate as u16) % 2 == 1
    }

    /// One full pass over every content word, scoring pass): for each word,
    /// try every candidate class and commit the best strictly-positive move.
    /// Ties broken by lowest class id (guaranteed by scanning classes in
    /// ascending order and only replacing on strict improvement).
    fn run_cycle(&mut self, reverse: bool) -> Result<u32, ClusterCatError> {
        // `reverse` only governs which neighbor list a from-scratch
        // implementation would locality-optimize the scan over; this
        // implementation already inspects the full window around every
        // occurrence (see `scoring::score_delta`), so no per-cycle state
        // depends on it beyond the cycle log line in `run`.
        let _ = reverse;
        let mut moved = 0u32;
        for word in FIRST_CONTENT_WORD..self.vocab.len() as u32 {
            // scoring phase: every candidate class is scored independently
            // (§5 parallel region ii), each task reading only the
            // read-only state shared across the cycle and writing nothing
            // but its own task-local delta.
            let old_class = self.assignment[word as usize];
            let corpus = self.corpus;
            let vocab = self.vocab;
            let assignment = &self.assignment;
            let arrays = &self.arrays;
            let occurrences = &self.occurrences;
            let weights = &self.cfg.weights;
            let unidirectional = self.cfg.unidirectional;

            let deltas: Vec<f64> = (0..self.num_classes)
                .into_par_iter()
                .map(|candidate| {
                    if candidate == old_class {
                        return 0.0;
                    }
                    scoring::score_delta(
                        word,
                        candidate,
                        corpus,
                        vocab,
                        assignment,
                        arrays,
                        occurrences,
                        weights,
                        unidirectional,
                    )
                })
                .collect();

            // selecting phase: argmax over classes in ascending order so
            // ties break to the lowest class id.
            let mut best_class = old_class;
            let mut best_delta = 0.0f64;
            for (candidate, &delta) in deltas.iter().enumerate() {
                if delta > best_delta {
                    best_delta = delta;
                    best_class = candidate as u32;
                }
            }

            if best_class == old_class || best_delta <= 0.0 {
                continue;
            }

            // applying phase
            self.apply_move(word, old_class, best_class);
            moved += 1;
        }
        // reporting phase: handled by the caller (`run`), which logs the
        // per-cycle move count returned here.
        Ok(moved)
    }

    /// Commit a class reassignment: update the assignment, both word x
    /// class matrices, and the dense count arrays, in that order. This is
    /// the only function in the crate that mutates shared clustering state.
    fn apply_move(&mut self, word: u32, old_class: u32, new_class: u32) {
        self.matrix_fwd.apply_move(word, old_class, new_class, &self.bigram_fwd);
        if let Some(rev) = &mut self.matrix_rev {
            rev.apply_move(word, old_class, new_class, self.bigram_rev.as_ref().unwrap());
        }
        update_count_arrays_for_move(
            &mut self.arrays,
            self.corpus,
            &self.assignment,
            &self.occurrences,
            word,
            old_class,
            new_class,
        );
        self.assignment[word as usize] = new_class;
    }

    /// Verbose-mode invariant checks (§6 exit codes 5, 6, 11), run after
    /// every cycle when `--verbose` is high enough. Never run otherwise —
    /// this is O(vocab + corpus), too costly to pay on every cycle by
    /// default.
    fn check_invariants(&self) -> Result<(), ClusterCatError> {
        for word in 0..self.vocab.len() as u32 {
            let class = self.assignment[word as usize];
            let class_count = self.arrays.read(&[class]);
            let word_count = self.vocab.count(word);
            if class_count < word_count {
                return Err(ClusterCatError::ClassCountBelowWordCount { class, class_count, word_count });
            }
        }

        // Full-corpus scoring during verbose reporting (§5 parallel region
        // iii): a parallel loop over sentences, each independently
        // validated, short-circuiting on the first invariant violation any
        // thread observes.
        let total_tokens = self.arrays.total_unigrams() as f64;
        (0..self.corpus.num_sentences()).into_par_iter().try_for_each(|sent_idx| {
            let sent = self.corpus.sentence(sent_idx);
            let classes: Vec<u32> = sent.iter().map(|&w| self.assignment[w as usize]).collect();
            for i in 1..sent.len() {
                let probs = crate::scoring::position_probs(
                    &classes,
                    sent,
                    i,
                    self.vocab,
                    &self.arrays,
                    self.arrays.max_array(),
                    &self.cfg.weights,
                    self.cfg.unidirectional,
                    total_tokens,
                );
                if probs.transition_prob > 1.0 {
                    return Err(ClusterCatError::TransitionProbabilityTooLarge(probs.transition_prob));
                }
                if !(0.0..=1.0).contains(&probs.class_prob) {
                    return Err(ClusterCatError::ClassProbabilityOutOfRange(probs.class_prob));
                }
            }
            Ok(())
        })?;
        Ok(())
    }

    pub fn num_classes(&self) -> u32 {
        self.num_classes
    }

    pub fn class_offset(&self) -> i32 {
        self.cfg.class_offset
    }
}

/// Assign classes by `word_id % num_classes`, visiting word ids in their
/// existing (descending-frequency) order. Deterministic, no RNG. Exposed at
/// crate visibility so [`crate::io::class_file`] can build the same default
/// assignment before applying an import override in its own tests.
pub(crate) fn init_round_robin(vocab_size: u32, num_classes: u32) -> Vec<u32> {
    (0..vocab_size).map(|id| id % num_classes).collect()
}

fn fill_count_arrays(arrays: &mut CountArrays, corpus: &Corpus, assignment: &[u32], max_array: u8) {
    for sent in corpus.sentences() {
        let classes: Vec<u32> = sent.iter().map(|&w| assignment[w as usize]).collect();
        for i in 0..classes.len() {
            arrays.increment(&[classes[i]]);
            if max_array > 1 && i + 1 < classes.len() {
                arrays.increment(&[classes[i], classes[i + 1]]);
            }
            if max_array > 2 && i + 2 < classes.len() {
                arrays.increment(&[classes[i], classes[i + 1], classes[i + 2]]);
            }
        }
    }
}

/// Update the dense count arrays for moving every occurrence of `word` from
/// `old_class` to `new_class`. Only n-gram windows touching a changed
/// position can differ, so this costs O(occurrences of `word`), not
/// O(corpus).
fn update_count_arrays_for_move(
    arrays: &mut CountArrays,
    corpus: &Corpus,
    assignment: &[u32],
    occurrences: &[Vec<(u32, u32)>],
    word: u32,
    old_class: u32,
    new_class: u32,
) {
    let max_array = arrays.max_array();
    let mut by_sentence: std::collections::BTreeMap<u32, Vec<u32>> = std::collections::BTreeMap::new();
    for &(s, p) in &occurrences[word as usize] {
        by_sentence.entry(s).or_default().push(p);
    }

    for (sent_idx, positions) in by_sentence {
        let sent = corpus.sentence(sent_idx as usize);
        let len = sent.len();
        let old_classes: Vec<u32> = sent.iter().map(|&id| assignment[id as usize]).collect();
        let mut new_classes = old_classes.clone();
        for &p in &positions {
            new_classes[p as usize] = new_class;
        }

        // Collect distinct (order, anchor_j) n-gram windows touched by any
        // changed position.
        let mut anchors: Vec<(u8, usize)> = Vec::new();
        for &p in &positions {
            let p = p as usize;
            anchors.push((1, p));
            if max_array > 1 {
                if p < len {
                    anchors.push((2, p));
                }
                if p + 1 < len {
                    anchors.push((2, p + 1));
                }
            }
            if max_array > 2 {
                for j in p..=(p + 2).min(len - 1) {
                    anchors.push((3, j));
                }
            }
        }
        anchors.sort_unstable();
        anchors.dedup();

        for (order, j) in anchors {
            match order {
                1 => {
                    arrays.sub_count(&[old_classes[j]], 1);
                    arrays.add_count(&[new_classes[j]], 1);
                }
                2 => {
                    if j < 1 {
                        continue;
                    }
                    arrays.sub_count(&[old_classes[j - 1], old_classes[j]], 1);
                    arrays.add_count(&[new_classes[j - 1], new_classes[j]], 1);
                }
                3 => {
                    if j < 2 {
                        continue;
                    }
                    arrays.sub_count(&[old_classes[j - 2], old_classes[j - 1], old_classes[j]], 1);
                    arrays.add_count(&[new_classes[j - 2], new_classes[j - 1], new_classes[j]], 1);
                }
                _ => unreachable!(),
            }
        }
    }
}

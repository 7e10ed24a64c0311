//! Command-line argument parsing for the `clustercat` binary.
//!
//! Uses `clap`'s derive API rather than hand-rolled getopt parsing: this CLI
//! has no legacy flag-spelling constraint to preserve character for
//! character.

use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::{Parser, ValueEnum};

use crate::config;

/// Which class-induction algorithm to run. Only `Exchange` is implemented;
/// the others are accepted at the CLI layer (matching the upstream tool's
/// full flag surface) and rejected with a clear error at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ClassAlgo {
    Exchange,
    Brown,
    ExchangeThenBrown,
}

/// Output format for `--word-vectors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum VectorFormat {
    Text,
    Binary,
}

/// Predictive-exchange word class induction from a tokenized corpus.
#[derive(Debug, Parser)]
#[command(name = "clustercat", version, about)]
pub struct Cli {
    /// Which class-induction algorithm to run.
    #[arg(long = "class-algo", value_enum, default_value_t = ClassAlgo::Exchange)]
    pub class_algo: ClassAlgo,

    /// Number of classes to partition the vocabulary into. Defaults to
    /// `floor(1.2 * sqrt(vocab_size))`, computed once the vocabulary is
    /// known (see `Config::resolve_num_classes`).
    #[arg(short = 'n', long = "num-classes")]
    pub num_classes: Option<u32>,

    /// Value added to every emitted class id (e.g. to reserve low ids).
    #[arg(long = "class-offset", default_value_t = config::CLASS_OFFSET_DEFAULT)]
    pub class_offset: i32,

    /// Minimum token count for a word to survive vocabulary filtering;
    /// rarer words fold into `<unk>`.
    #[arg(long = "min-count", default_value_t = config::MIN_COUNT_DEFAULT)]
    pub min_count: u64,

    /// Highest class-n-gram order to maintain densely (1..=3).
    #[arg(long = "max-array", default_value_t = config::MAX_ARRAY_DEFAULT)]
    pub max_array: u8,

    /// Number of worker threads for the parallel regions of the exchange
    /// driver (0 = use all available cores).
    #[arg(short = 'j', long = "num-threads", default_value_t = config::NUM_THREADS_DEFAULT)]
    pub num_threads: usize,

    /// Maximum number of sentences kept in the sentence store.
    #[arg(long = "tune-sents", default_value_t = config::MAX_TUNE_SENTS_DEFAULT)]
    pub tune_sents: u64,

    /// Hard cap on the number of exchange cycles.
    #[arg(long = "tune-cycles", default_value_t = config::TUNE_CYCLES_DEFAULT)]
    pub tune_cycles: u16,

    /// Alternate the scan direction every `N` cycles (0 = never alternate).
    #[arg(long = "rev-alternate", default_value_t = config::REV_ALTERNATE_DEFAULT)]
    pub rev_alternate: u8,

    /// Disable the reverse (successor) direction entirely: future
    /// interpolation weights are forced to zero and the reverse matrix and
    /// predecessor list are never built.
    #[arg(long = "unidirectional", default_value_t = false)]
    pub unidirectional: bool,

    /// Print each class's total token frequency alongside its id.
    #[arg(long = "print-freqs", default_value_t = false)]
    pub print_freqs: bool,

    /// Emit a word-vectors file alongside the classes file, in the given
    /// format.
    #[arg(long = "word-vectors", value_enum)]
    pub word_vectors: Option<VectorFormat>,

    /// Import initial class assignments from a `word\tclass` file; listed
    /// words keep their assigned class throughout, all others still start
    /// from the round-robin assignment.
    #[arg(long = "class-file")]
    pub class_file: Option<PathBuf>,

    /// Increase verbosity by one level (repeatable).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Decrease verbosity by one level (repeatable); may go negative,
    /// silencing warnings entirely.
    #[arg(short = 'q', long = "quiet", action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Input corpus path (defaults to stdin when omitted).
    #[arg(long = "in")]
    pub input: Option<PathBuf>,

    /// Output classes path (defaults to stdout when omitted).
    #[arg(long = "out")]
    pub output: Option<PathBuf>,
}

/// Fully validated configuration derived from [`Cli`]. Kept distinct from
/// `Cli` so downstream code never has to re-check invariants clap cannot
/// express (e.g. `max_array` range, `class_algo` support).
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` means "derive from vocabulary size"; resolved by
    /// [`Config::resolve_num_classes`] once the vocabulary is built.
    pub num_classes: Option<u32>,
    pub class_offset: i32,
    pub min_count: u64,
    pub max_array: u8,
    pub num_threads: usize,
    pub tune_sents: u64,
    pub tune_cycles: u16,
    pub rev_alternate: u8,
    pub unidirectional: bool,
    pub print_freqs: bool,
    pub word_vectors: Option<VectorFormat>,
    pub class_file: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl Config {
    /// Validate a parsed [`Cli`] into a [`Config`], resolving `--verbose`
    /// against `--quiet` into the signed display level and rejecting
    /// unsupported `class_algo` choices and out-of-range `max_array` values.
    pub fn from_cli(cli: Cli) -> anyhow::Result<Config> {
        if cli.class_algo != ClassAlgo::Exchange {
            bail!(
                "class-algo {:?} is not implemented; only 'exchange' is supported",
                cli.class_algo
            );
        }
        let (lo, hi) = config::MAX_ARRAY_RANGE;
        if cli.max_array < lo || cli.max_array > hi {
            return Err(anyhow!(
                "--max-array value {} should be between {}-{}",
                cli.max_array,
                lo,
                hi
            ));
        }
        if cli.num_classes == Some(0) {
            bail!("--num-classes must be at least 1");
        }

        let level = crate::cli::constants::DEFAULT_DISPLAY_LEVEL + cli.verbose as i32 - cli.quiet as i32;
        crate::cli::constants::set_display_level(level);

        let num_threads = if cli.num_threads == 0 {
            crate::util::count_cores()
        } else {
            cli.num_threads
        };

        Ok(Config {
            num_classes: cli.num_classes,
            class_offset: cli.class_offset,
            min_count: cli.min_count,
            max_array: cli.max_array,
            num_threads,
            tune_sents: cli.tune_sents,
            tune_cycles: cli.tune_cycles,
            rev_alternate: cli.rev_alternate,
            unidirectional: cli.unidirectional,
            print_freqs: cli.print_freqs,
            word_vectors: cli.word_vectors,
            class_file: cli.class_file,
            input: cli.input,
            output: cli.output,
        })
    }

    /// Resolve `num_classes` against a known vocabulary size: the explicit
    /// `--num-classes` value if given, else `floor(1.2 * sqrt(vocab_size))`
    /// per the distilled spec's §6 default.
    pub fn resolve_num_classes(&self, vocab_size: usize) -> u32 {
        self.num_classes
            .unwrap_or_else(|| ((1.2 * (vocab_size as f64).sqrt()).floor() as u32).max(1))
    }
}

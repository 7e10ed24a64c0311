//! Binary entry point for the `clustercat` command-line tool.
//!
//! Parses arguments, reads the input corpus, runs the predictive-exchange
//! driver, and writes the classes (and optionally word-vectors) output.
//! A `run` function returns a process exit code and a thin `main` calls it
//! and exits.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use clap::Parser;

use clustercat::cli::args::{Cli, Config, VectorFormat as CliVectorFormat};
use clustercat::displaylevel;
use clustercat::error::ClusterCatError;
use clustercat::exchange::{ExchangeConfig, ExchangeModel};
use clustercat::io::{class_file, reader, writer};
use clustercat::{Corpus, Vocabulary};

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn io::BufRead>> {
    match path {
        Some(p) => Ok(Box::new(BufReader::new(File::open(p)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn io::Write>> {
    match path {
        Some(p) => Ok(Box::new(BufWriter::new(File::create(p)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn run(cfg: Config) -> Result<(), ClusterCatError> {
    displaylevel!(
        3,
        "*** {} v{}, by {} ***",
        clustercat::cli::constants::PROGRAM_NAME,
        env!("CARGO_PKG_VERSION"),
        clustercat::cli::constants::AUTHOR
    );

    let pool = clustercat::pool::build_pool(cfg.num_threads);

    let input = open_input(cfg.input.as_deref())
        .map_err(|e| ClusterCatError::VocabInconsistency(format!("unable to open input: {e}")))?;
    let sentences = reader::read_sentences(input, cfg.tune_sents)?;

    let vocab = Vocabulary::build(&sentences, cfg.min_count);
    let corpus = Corpus::build(&vocab, &sentences);
    let num_classes = cfg.resolve_num_classes(vocab.len());

    let estimated_bytes = (vocab.len() * (std::mem::size_of::<String>() + std::mem::size_of::<u64>()))
        + corpus.num_sentences() * std::mem::size_of::<u32>() * 2
        + (num_classes as usize).saturating_pow(cfg.max_array as u32) * std::mem::size_of::<u64>();
    displaylevel!(
        -1,
        "read {} sentences, {} distinct words after filtering (min_count={}); {} classes; ~{} KB estimated working set",
        corpus.num_sentences(),
        vocab.len(),
        cfg.min_count,
        num_classes,
        estimated_bytes / 1024
    );

    let exchange_cfg = ExchangeConfig {
        weights: clustercat::config::INTERPOLATION_WEIGHTS,
        unidirectional: cfg.unidirectional,
        rev_alternate: cfg.rev_alternate,
        tune_cycles: cfg.tune_cycles,
        class_offset: cfg.class_offset,
    };

    let mut model = pool.install(|| ExchangeModel::build(&vocab, &corpus, num_classes, cfg.max_array, exchange_cfg))?;

    if let Some(class_file_path) = &cfg.class_file {
        let reader = open_input(Some(class_file_path.as_path()))
            .map_err(|e| ClusterCatError::VocabInconsistency(format!("unable to open class file: {e}")))?;
        let mut assignment = model.assignment().to_vec();
        class_file::apply_class_file(reader, &vocab, cfg.class_offset, model.num_classes(), &mut assignment)?;
        model.set_assignment(assignment);
    }

    let report = pool.install(|| model.run())?;
    displaylevel!(1, "exchange converged after {} cycle(s)", report.cycles_run);

    let output = open_output(cfg.output.as_deref())
        .map_err(|e| ClusterCatError::VocabInconsistency(format!("unable to open output: {e}")))?;
    writer::write_classes(output, &vocab, model.assignment(), cfg.class_offset, cfg.print_freqs)
        .map_err(|e| ClusterCatError::VocabInconsistency(format!("unable to write classes: {e}")))?;

    if let Some(format) = cfg.word_vectors {
        let matrix = model.forward_matrix();
        let vectors_path = cfg.output.as_ref().map(|p| p.with_extension("vectors"));
        let vectors_out = open_output(vectors_path.as_deref())
            .map_err(|e| ClusterCatError::VocabInconsistency(format!("unable to open vectors output: {e}")))?;
        let format = match format {
            CliVectorFormat::Text => writer::VectorFormat::Text,
            CliVectorFormat::Binary => writer::VectorFormat::Binary,
        };
        writer::write_vectors(vectors_out, &vocab, matrix, format)
            .map_err(|e| ClusterCatError::VocabInconsistency(format!("unable to write vectors: {e}")))?;
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let cfg = match Config::from_cli(cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("clustercat: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cfg) {
        eprintln!("clustercat: {e}");
        std::process::exit(e.exit_code());
    }
}

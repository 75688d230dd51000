//! # CLI Module
//!
//! Command-line interface for fingerprinting and ranking images.
//!
//! ## Usage
//! ```bash
//! # Print fingerprints
//! phash hash a.jpg b.png
//!
//! # Build a corpus from directories
//! phash index ~/Pictures --output pictures.corpus
//!
//! # Twelve nearest images to a query
//! phash rank query.jpg --corpus pictures.corpus
//!
//! # Are two images the same picture?
//! phash compare a.jpg b.jpg --threshold 10
//! ```
//!
//! Results go to stdout; progress, warnings and logs go to stderr.

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use phash_ranker::core::comparator::{self, MatchType, RankedResult, ThresholdStrategy};
use phash_ranker::core::corpus::Corpus;
use phash_ranker::core::hasher::{BitPolicy, HasherConfig, ImageHasher, PerceptualHasher};
use phash_ranker::core::pipeline::{
    fingerprint_batch, CancellationToken, FailurePolicy, IndexResult, Pipeline,
};
use phash_ranker::error::{PhashError, Result};
use phash_ranker::events::{null_sender, Event, EventChannel, HashEvent, PipelineEvent};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

/// phash - perceptual image fingerprints and similarity ranking
#[derive(Parser, Debug)]
#[command(name = "phash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the fingerprint of each image as `<path> <bits>`
    Hash {
        /// Image files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        hashing: HashingArgs,
    },

    /// Fingerprint every image under the given directories into a corpus file
    Index {
        /// Directories (or files) to index
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Corpus file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Stop at the first image that fails instead of skipping it
        #[arg(long)]
        fail_fast: bool,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,

        #[command(flatten)]
        hashing: HashingArgs,
    },

    /// Rank corpus entries by similarity to a query image
    Rank {
        /// Query image
        query: PathBuf,

        /// Corpus files (merged in the order given)
        #[arg(short, long = "corpus", required = true)]
        corpora: Vec<PathBuf>,

        /// Number of results to show
        #[arg(short = 'k', long, default_value = "12")]
        top: usize,

        /// Show every entry instead of the top K
        #[arg(long, conflicts_with = "top")]
        all: bool,

        /// Output format
        #[arg(short = 'f', long, default_value = "pretty")]
        format: OutputFormat,

        #[command(flatten)]
        hashing: HashingArgs,
    },

    /// Compare two images; exits 0 when they match, 1 when they do not
    Compare {
        first: PathBuf,
        second: PathBuf,

        /// Maximum distance that still counts as a match
        #[arg(short, long, default_value = "10")]
        threshold: u32,

        #[command(flatten)]
        hashing: HashingArgs,
    },
}

/// Fingerprint parameters shared by every command
#[derive(Args, Debug, Clone, Copy)]
struct HashingArgs {
    /// Working resolution N of the DCT
    #[arg(long, default_value = "32")]
    size: usize,

    /// Side K of the low-frequency block that becomes bits
    #[arg(long, default_value = "8")]
    block_size: usize,

    /// Which block coefficients become bits
    #[arg(long, default_value = "exclude-dc")]
    bit_policy: BitPolicyArg,
}

impl HashingArgs {
    fn config(&self) -> HasherConfig {
        HasherConfig::new()
            .size(self.size)
            .block_size(self.block_size)
            .bit_policy(self.bit_policy.into())
    }

    fn hasher(&self) -> Result<PerceptualHasher> {
        Ok(self.config().build()?)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BitPolicyArg {
    /// Every block coefficient except DC (K²-1 bits)
    ExcludeDc,
    /// Only coefficients with both frequencies non-zero ((K-1)² bits)
    ExcludeFirstRowAndColumn,
}

impl From<BitPolicyArg> for BitPolicy {
    fn from(arg: BitPolicyArg) -> Self {
        match arg {
            BitPolicyArg::ExcludeDc => BitPolicy::ExcludeDc,
            BitPolicyArg::ExcludeFirstRowAndColumn => BitPolicy::ExcludeFirstRowAndColumn,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (`<identifier> <distance>` per line)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hash { files, hashing } => run_hash(files, hashing),
        Commands::Index {
            paths,
            output,
            fail_fast,
            include_hidden,
            hashing,
        } => run_index(paths, output, fail_fast, include_hidden, hashing),
        Commands::Rank {
            query,
            corpora,
            top,
            all,
            format,
            hashing,
        } => run_rank(query, corpora, (!all).then_some(top), format, hashing),
        Commands::Compare {
            first,
            second,
            threshold,
            hashing,
        } => run_compare(first, second, threshold, hashing),
    }
}

fn run_hash(files: Vec<PathBuf>, hashing: HashingArgs) -> Result<ExitCode> {
    let hasher = hashing.hasher()?;
    let outcomes = fingerprint_batch(
        &hasher,
        &files,
        FailurePolicy::Skip,
        &CancellationToken::new(),
        &null_sender(),
    );

    let term = Term::stderr();
    let mut failed = 0;

    for (path, outcome) in outcomes {
        match outcome {
            Ok(fingerprint) => println!("{} {}", path.display(), fingerprint),
            Err(e) => {
                failed += 1;
                term.write_line(&format!("{} {}", style("error:").red().bold(), e))
                    .ok();
            }
        }
    }

    Ok(completion_code(failed))
}

/// 0 when every image was fingerprinted, 1 when some were skipped
fn completion_code(failed: usize) -> ExitCode {
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_index(
    paths: Vec<PathBuf>,
    output: PathBuf,
    fail_fast: bool,
    include_hidden: bool,
    hashing: HashingArgs,
) -> Result<ExitCode> {
    let term = Term::stderr();

    let policy = if fail_fast {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Skip
    };

    let pipeline = Pipeline::builder()
        .paths(paths)
        .hasher_config(hashing.config())
        .include_hidden(include_hidden)
        .failure_policy(policy)
        .build();

    let (sender, receiver) = EventChannel::new();

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    progress_clone.set_message(phase.to_string());
                }
                Event::Hash(HashEvent::Started { total_images }) => {
                    progress_clone.set_length(total_images as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    progress_clone.set_position(p.completed as u64);
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled)
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    progress_clone.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    drop(sender);
    event_thread.join().ok();
    progress.finish_and_clear();

    let result = result?;
    result.corpus.save(&output)?;

    print_index_summary(&term, &result, &output);
    Ok(completion_code(result.failures.len()))
}

fn print_index_summary(term: &Term, result: &IndexResult, output: &std::path::Path) {
    for failure in &result.failures {
        term.write_line(&format!(
            "{} {}",
            style("skipped:").yellow().bold(),
            failure.error
        ))
        .ok();
    }

    term.write_line(&format!(
        "{} Indexed {} of {} images into {} in {:.1}s",
        style("✓").green().bold(),
        style(result.corpus.len()).cyan(),
        result.total_images,
        output.display(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
}

fn run_rank(
    query: PathBuf,
    corpora: Vec<PathBuf>,
    top: Option<usize>,
    format: OutputFormat,
    hashing: HashingArgs,
) -> Result<ExitCode> {
    let hasher = hashing.hasher()?;
    let fingerprint = hasher.hash_file(&query)?;

    let mut corpus = Corpus::new();
    for path in &corpora {
        corpus.extend(Corpus::load(path)?)?;
    }

    let results = comparator::rank_parallel(&fingerprint, corpus.entries(), top)?;

    match format {
        OutputFormat::Pretty => print_pretty_ranking(&query, corpus.len(), &results),
        OutputFormat::Json => print_json_ranking(&query, &fingerprint.to_bit_string(), &results)?,
        OutputFormat::Minimal => {
            for result in &results {
                println!("{} {}", result.identifier, result.distance);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_pretty_ranking(query: &std::path::Path, corpus_size: usize, results: &[RankedResult]) {
    let term = Term::stdout();

    term.write_line(&format!(
        "{} {} {}",
        style("Nearest to").bold(),
        style(query.display()).cyan(),
        style(format!("({} of {} entries)", results.len(), corpus_size)).dim()
    ))
    .ok();
    term.write_line("").ok();

    if results.is_empty() {
        term.write_line("  Corpus is empty").ok();
        return;
    }

    for (rank, result) in results.iter().enumerate() {
        let match_type = result.match_type();

        let label = match match_type {
            MatchType::Exact | MatchType::NearExact => style(match_type.to_string()).green(),
            MatchType::Similar => style(match_type.to_string()).yellow(),
            MatchType::MaybeSimilar | MatchType::Different => style(match_type.to_string()).dim(),
        };

        term.write_line(&format!(
            "  {:>3}. {:>3}  {:>5.1}%  {:<18} {}",
            rank + 1,
            result.distance,
            result.similarity_percent(),
            label,
            result.identifier
        ))
        .ok();
    }
}

fn print_json_ranking(query: &std::path::Path, bits: &str, results: &[RankedResult]) -> Result<()> {
    let output = serde_json::json!({
        "query": query,
        "fingerprint": bits,
        "results": results,
    });

    let text =
        serde_json::to_string_pretty(&output).map_err(|e| PhashError::Output(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn run_compare(
    first: PathBuf,
    second: PathBuf,
    threshold: u32,
    hashing: HashingArgs,
) -> Result<ExitCode> {
    let hasher = hashing.hasher()?;
    let strategy = ThresholdStrategy::for_bit_len(threshold, hasher.bit_len())?;

    let a = hasher.hash_file(&first)?;
    let b = hasher.hash_file(&second)?;
    let result = comparator::compare(&a, &b, &strategy)?;

    let verdict = if result.is_match {
        style("same picture").green().bold()
    } else {
        style("different pictures").red().bold()
    };

    println!(
        "distance {} / {} bits ({:.1}% similar, {}): {}",
        result.distance,
        a.len(),
        result.similarity_percent,
        result.match_type,
        verdict
    );
    println!(
        "{}",
        style(format!("bits: {}", hashing.config().policy().description())).dim()
    );

    Ok(if result.is_match {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(a: ExitCode, b: ExitCode) -> bool {
        format!("{a:?}") == format!("{b:?}")
    }

    #[test]
    fn skipped_images_fail_the_command() {
        assert!(same(completion_code(0), ExitCode::SUCCESS));
        assert!(same(completion_code(3), ExitCode::FAILURE));
    }

    #[test]
    fn index_accepts_fail_fast_and_hashing_flags() {
        let cli = Cli::try_parse_from([
            "phash", "index", "photos", "-o", "photos.corpus", "--fail-fast", "--size", "64",
        ])
        .unwrap();

        match cli.command {
            Commands::Index {
                fail_fast, hashing, ..
            } => {
                assert!(fail_fast);
                assert_eq!(hashing.config().transform_size(), 64);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

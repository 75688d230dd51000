//! # phash CLI
//!
//! Command-line interface for perceptual fingerprints.
//!
//! ## Usage
//! ```bash
//! phash index ~/Pictures --output pictures.corpus
//! phash rank query.jpg --corpus pictures.corpus --top 12
//! RUST_LOG=debug phash compare a.jpg b.jpg
//! ```

mod cli;

use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    phash_ranker::init_tracing();

    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::from(2)
        }
    }
}

//! # phash-ranker
//!
//! DCT perceptual image fingerprints and Hamming-distance similarity ranking.
//!
//! An image is reduced to a small grayscale matrix, transformed with a 2D
//! DCT, and its low-frequency coefficients are thresholded into a bit
//! string. Visually similar images (rescaled, recompressed, slightly
//! brightened) end up with fingerprints a few bits apart, so a corpus can be
//! ranked against a query by Hamming distance.
//!
//! ## Architecture
//! - `core` - Fingerprinting, corpus handling, ranking and batch indexing
//! - `events` - Progress events for front ends
//! - `error` - Error types
//!
//! ## Example
//! ```rust,ignore
//! use phash_ranker::core::corpus::Corpus;
//! use phash_ranker::core::hasher::{HasherConfig, ImageHasher};
//!
//! let hasher = HasherConfig::new().build()?;
//! let query = hasher.hash_file("query.jpg".as_ref())?;
//! let nearest = Corpus::load("pictures.corpus")?.rank(&query, Some(12))?;
//! ```

pub mod core;
pub mod error;
pub mod events;

pub use error::{PhashError, Result};

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`.
///
/// Call once from an application entry point. Returns `false` if a global
/// subscriber was already installed.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

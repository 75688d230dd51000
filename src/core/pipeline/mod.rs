//! # Pipeline Module
//!
//! Builds a corpus from directories of images.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover image files in the given directories
//! 2. **Fingerprint** - Hash every image in parallel
//! 3. **Index** - Collect successful fingerprints into a [`Corpus`](crate::core::corpus::Corpus)
//!
//! ## Parallelism
//! Uses rayon for parallel fingerprinting across multiple CPU cores.
//! Results are always reported in scan order.

mod batch;
mod executor;

pub use batch::{fingerprint_batch, BatchItem, CancellationToken, FailurePolicy};
pub use executor::{IndexResult, ItemFailure, Pipeline, PipelineBuilder, PipelineConfig};

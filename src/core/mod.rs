//! # Core Module
//!
//! The fingerprinting and ranking engine.
//!
//! ## Modules
//! - `hasher` - Decodes images and computes DCT fingerprints
//! - `comparator` - Hamming distance, match classification and ranking
//! - `corpus` - Named fingerprint collections and their text format
//! - `scanner` - Discovers image files in directories
//! - `pipeline` - Indexes directories into a corpus in parallel

pub mod comparator;
pub mod corpus;
pub mod hasher;
pub mod pipeline;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{MatchType, RankedResult};
pub use corpus::{Corpus, CorpusEntry};
pub use hasher::{Fingerprint, HasherConfig, ImageHasher};
pub use scanner::ImageFile;

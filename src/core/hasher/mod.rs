//! # Hasher Module
//!
//! Computes DCT perceptual fingerprints for images.
//!
//! ## How It Works
//! 1. Convert to grayscale and resize to N×N (default 32×32)
//! 2. Apply a 2D DCT
//! 3. Keep the top-left K×K low-frequency block (default 8×8)
//! 4. Set one bit per kept coefficient: above the block mean (DC excluded) or not
//! 5. Compare fingerprints using Hamming distance
//!
//! Fingerprints are only comparable when produced with the same
//! [`HasherConfig`].
//!
//! ## Performance Optimizations
//! - Uses `zune-jpeg` for 1.5-2x faster JPEG decoding
//! - Uses `fast_image_resize` for SIMD-accelerated resizing
//! - Separable DCT with a precomputed cosine table
//!
//! ## Example
//! ```rust,ignore
//! use phash_ranker::core::hasher::{HasherConfig, ImageHasher};
//!
//! let hasher = HasherConfig::new()
//!     .size(32)
//!     .block_size(8)
//!     .build()?;
//!
//! let fingerprint = hasher.hash_file(&path)?;
//! ```

mod algorithms;
pub mod dct;
pub mod fast_decode;
mod fingerprint;
mod generator;
pub mod matrix;
pub mod normalize;
mod traits;

pub use algorithms::PerceptualHasher;
pub use dct::DctTransform;
pub use fast_decode::FastDecoder;
pub use fingerprint::Fingerprint;
pub use generator::{BitPolicy, FingerprintGenerator};
pub use matrix::{CoefficientMatrix, IntensityMatrix, SquareMatrix};
pub use normalize::ImageNormalizer;
pub use traits::ImageHasher;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Default working resolution N
pub const DEFAULT_SIZE: usize = 32;

/// Default low-frequency block size K
pub const DEFAULT_BLOCK_SIZE: usize = 8;

/// Largest accepted working resolution N
pub const MAX_SIZE: usize = 1024;

/// Configuration builder for hashers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasherConfig {
    /// Working resolution N of the DCT
    size: usize,
    /// Side K of the retained low-frequency block
    block_size: usize,
    /// Which block cells become bits
    bit_policy: BitPolicy,
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults (32, 8, exclude-dc)
    pub fn new() -> Self {
        Self {
            size: DEFAULT_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            bit_policy: BitPolicy::default(),
        }
    }

    /// Set the working resolution N.
    ///
    /// This only bounds the cost of the DCT; it does not change the
    /// fingerprint length.
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the low-frequency block size K (2 ≤ K ≤ N)
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the bit policy
    pub fn bit_policy(mut self, bit_policy: BitPolicy) -> Self {
        self.bit_policy = bit_policy;
        self
    }

    /// Working resolution N
    pub fn transform_size(&self) -> usize {
        self.size
    }

    /// Low-frequency block size K
    pub fn retained_block_size(&self) -> usize {
        self.block_size
    }

    /// Bit policy
    pub fn policy(&self) -> BitPolicy {
        self.bit_policy
    }

    /// Check N and K
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_SIZE).contains(&self.size) {
            return Err(ConfigError::InvalidSize { size: self.size });
        }
        if self.block_size < 2 || self.block_size > self.size {
            return Err(ConfigError::InvalidBlockSize {
                block_size: self.block_size,
                size: self.size,
            });
        }
        Ok(())
    }

    /// Fingerprint length under this configuration
    pub fn bit_len(&self) -> usize {
        self.bit_policy.bit_len(self.block_size)
    }

    /// Build the hasher
    pub fn build(self) -> Result<PerceptualHasher, ConfigError> {
        PerceptualHasher::new(self)
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_classic_phash() {
        let config = HasherConfig::new();
        assert_eq!(config.size, 32);
        assert_eq!(config.block_size, 8);
        assert_eq!(config.bit_policy, BitPolicy::ExcludeDc);
        assert_eq!(config.bit_len(), 63);
    }

    #[test]
    fn config_builder_works() {
        let config = HasherConfig::new()
            .size(16)
            .block_size(4)
            .bit_policy(BitPolicy::ExcludeFirstRowAndColumn);

        assert_eq!(config.size, 16);
        assert_eq!(config.block_size, 4);
        assert_eq!(config.bit_len(), 9);
    }

    #[test]
    fn build_creates_hasher() {
        let hasher = HasherConfig::new().build();
        assert!(hasher.is_ok());
    }

    #[test]
    fn block_larger_than_size_is_rejected() {
        let result = HasherConfig::new().size(8).block_size(9).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidBlockSize {
                block_size: 9,
                size: 8
            })
        ));
    }

    #[test]
    fn tiny_sizes_are_rejected() {
        assert_eq!(
            HasherConfig::new().size(1).block_size(1).validate(),
            Err(ConfigError::InvalidSize { size: 1 })
        );
        assert!(HasherConfig::new().block_size(1).validate().is_err());
    }

    #[test]
    fn oversized_transform_is_rejected_before_allocating() {
        assert!(HasherConfig::new().size(MAX_SIZE).validate().is_ok());
        assert!(matches!(
            HasherConfig::new().size(100_000).build(),
            Err(ConfigError::InvalidSize { size: 100_000 })
        ));
    }
}

//! Bit extraction from the low-frequency DCT block.

use super::fingerprint::Fingerprint;
use super::matrix::CoefficientMatrix;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Which cells of the K×K low-frequency block become fingerprint bits.
///
/// The threshold is always the mean of the block without the DC term.
/// The two policies yield different lengths for every K ≥ 2, so
/// fingerprints of mixed policies can never be compared by accident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitPolicy {
    /// Every cell except (0,0): K·K − 1 bits
    #[default]
    ExcludeDc,
    /// Only cells off the first row and column: (K − 1)² bits
    ExcludeFirstRowAndColumn,
}

impl BitPolicy {
    /// Number of bits emitted for a K×K block
    pub fn bit_len(&self, block_size: usize) -> usize {
        match self {
            BitPolicy::ExcludeDc => (block_size * block_size).saturating_sub(1),
            BitPolicy::ExcludeFirstRowAndColumn => block_size.saturating_sub(1).pow(2),
        }
    }

    fn includes(&self, u: usize, v: usize) -> bool {
        match self {
            BitPolicy::ExcludeDc => (u, v) != (0, 0),
            BitPolicy::ExcludeFirstRowAndColumn => u != 0 && v != 0,
        }
    }

    /// Human-readable description of the policy
    pub fn description(&self) -> &'static str {
        match self {
            BitPolicy::ExcludeDc => "all low-frequency cells except the DC term",
            BitPolicy::ExcludeFirstRowAndColumn => {
                "low-frequency cells outside the first row and column"
            }
        }
    }
}

impl std::fmt::Display for BitPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitPolicy::ExcludeDc => write!(f, "exclude-dc"),
            BitPolicy::ExcludeFirstRowAndColumn => write!(f, "exclude-first-row-and-column"),
        }
    }
}

/// Turns a coefficient matrix into a fingerprint
#[derive(Debug, Clone)]
pub struct FingerprintGenerator {
    block_size: usize,
    policy: BitPolicy,
}

impl FingerprintGenerator {
    /// Create a generator for a K×K block
    pub fn new(block_size: usize, policy: BitPolicy) -> Self {
        Self { block_size, policy }
    }

    /// Mean of the K×K block, DC term excluded
    pub fn threshold(&self, coefficients: &CoefficientMatrix) -> Result<f64, ConfigError> {
        self.check(coefficients)?;

        let k = self.block_size;
        let total: f64 = (0..k)
            .flat_map(|u| coefficients.row(u)[..k].iter())
            .sum();

        Ok((total - coefficients.get(0, 0)) / (k * k - 1) as f64)
    }

    /// Emit one bit per selected block cell, row-major; 1 when the
    /// coefficient is strictly above the threshold.
    pub fn generate(&self, coefficients: &CoefficientMatrix) -> Result<Fingerprint, ConfigError> {
        let threshold = self.threshold(coefficients)?;
        let k = self.block_size;

        let bits = (0..k)
            .flat_map(|u| (0..k).map(move |v| (u, v)))
            .filter(|&(u, v)| self.policy.includes(u, v))
            .map(|(u, v)| coefficients.get(u, v) > threshold);

        Ok(Fingerprint::from_bits(bits))
    }

    /// Length of every fingerprint this generator produces
    pub fn bit_len(&self) -> usize {
        self.policy.bit_len(self.block_size)
    }

    fn check(&self, coefficients: &CoefficientMatrix) -> Result<(), ConfigError> {
        if self.block_size < 2 || self.block_size > coefficients.size() {
            return Err(ConfigError::InvalidBlockSize {
                block_size: self.block_size,
                size: coefficients.size(),
            });
        }
        Ok(())
    }
}

//! Trait definitions for match decisions.

use super::MatchType;
use crate::error::CompareError;

/// Strategy trait for deciding whether two fingerprints show the same picture
pub trait ComparisonStrategy: Send + Sync {
    /// Whether a distance counts as a match
    fn is_match(&self, distance: u32) -> bool;

    /// Classify the match type based on distance
    fn classify(&self, distance: u32) -> MatchType;

    /// Get the threshold used
    fn threshold(&self) -> u32;

    /// Human-readable description of the strategy
    fn description(&self) -> String;
}

/// Simple threshold-based comparison strategy
#[derive(Debug, Clone)]
pub struct ThresholdStrategy {
    /// Maximum distance to consider a match
    threshold: u32,
}

impl ThresholdStrategy {
    /// Create a new threshold strategy
    ///
    /// Recommended thresholds for 49-63 bit fingerprints:
    /// - 5: Conservative, few false positives
    /// - 10: Balanced (default)
    /// - 15: Permissive, catches heavier edits
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Create a strategy, rejecting thresholds larger than the fingerprint
    pub fn for_bit_len(threshold: u32, bits: usize) -> Result<Self, CompareError> {
        if threshold as usize > bits {
            return Err(CompareError::InvalidThreshold {
                value: threshold,
                bits,
            });
        }
        Ok(Self::new(threshold))
    }

    /// Create a conservative strategy (threshold = 5)
    pub fn conservative() -> Self {
        Self::new(5)
    }

    /// Create a balanced strategy (threshold = 10)
    pub fn balanced() -> Self {
        Self::new(10)
    }

    /// Create a permissive strategy (threshold = 15)
    pub fn permissive() -> Self {
        Self::new(15)
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self::balanced()
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn is_match(&self, distance: u32) -> bool {
        distance <= self.threshold
    }

    fn classify(&self, distance: u32) -> MatchType {
        MatchType::from_distance(distance)
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn description(&self) -> String {
        format!(
            "Threshold strategy: images with distance <= {} are considered the same",
            self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_strategy_at_boundary() {
        let strategy = ThresholdStrategy::new(5);

        assert!(strategy.is_match(4));
        assert!(strategy.is_match(5));
        assert!(!strategy.is_match(6));
    }

    #[test]
    fn preset_strategies() {
        assert_eq!(ThresholdStrategy::conservative().threshold(), 5);
        assert_eq!(ThresholdStrategy::balanced().threshold(), 10);
        assert_eq!(ThresholdStrategy::permissive().threshold(), 15);
        assert_eq!(ThresholdStrategy::default().threshold(), 10);
    }

    #[test]
    fn threshold_beyond_bit_len_is_rejected() {
        assert!(ThresholdStrategy::for_bit_len(63, 63).is_ok());
        assert_eq!(
            ThresholdStrategy::for_bit_len(64, 63).unwrap_err(),
            CompareError::InvalidThreshold { value: 64, bits: 63 }
        );
    }

    #[test]
    fn description_includes_threshold() {
        assert!(ThresholdStrategy::new(7).description().contains('7'));
    }
}

//! # Comparator Module
//!
//! Compares fingerprints and ranks a corpus by similarity to a query.
//!
//! ## How It Works
//! 1. Hamming distance from the query to every corpus entry (full linear scan)
//! 2. Order by ascending distance, ties by corpus order
//! 3. Optionally keep only the K nearest
//!
//! ## Match Classification
//! | Distance | Classification    |
//! |----------|-------------------|
//! | 0        | Exact match       |
//! | 1-4      | Near-exact        |
//! | 5-10     | Similar           |
//! | 11-15    | Possibly similar  |
//! | 16+      | Different         |

mod traits;

pub use traits::{ComparisonStrategy, ThresholdStrategy};

use crate::core::corpus::CorpusEntry;
use crate::core::hasher::Fingerprint;
use crate::error::CompareError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One corpus entry together with its distance to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub identifier: String,
    pub fingerprint: Fingerprint,
    pub distance: u32,
}

impl RankedResult {
    /// Similarity to the query as a percentage (0-100)
    pub fn similarity_percent(&self) -> f64 {
        match self.fingerprint.len() {
            0 => 100.0,
            bits => 100.0 * (1.0 - self.distance as f64 / bits as f64),
        }
    }

    pub fn match_type(&self) -> MatchType {
        MatchType::from_distance(self.distance)
    }
}

/// Result of comparing two fingerprints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Hamming distance between the fingerprints
    pub distance: u32,
    /// Similarity as a percentage (0-100)
    pub similarity_percent: f64,
    /// Classification of the match
    pub match_type: MatchType,
    /// Whether the strategy accepts this distance
    pub is_match: bool,
}

/// Classification of match types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance = 0, identical perceptual content
    Exact,
    /// Distance 1-4, virtually identical
    NearExact,
    /// Distance 5-10, likely the same picture
    Similar,
    /// Distance 11-15, possibly related
    MaybeSimilar,
    /// Distance 16+
    Different,
}

impl MatchType {
    /// Classify based on Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            5..=10 => MatchType::Similar,
            11..=15 => MatchType::MaybeSimilar,
            _ => MatchType::Different,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact Match"),
            MatchType::NearExact => write!(f, "Near-Exact Match"),
            MatchType::Similar => write!(f, "Similar"),
            MatchType::MaybeSimilar => write!(f, "Possibly Similar"),
            MatchType::Different => write!(f, "Different"),
        }
    }
}

/// Hamming distance between two fingerprints of equal length
pub fn distance(a: &Fingerprint, b: &Fingerprint) -> Result<u32, CompareError> {
    a.distance(b)
}

/// Compare two fingerprints under a strategy
pub fn compare(
    a: &Fingerprint,
    b: &Fingerprint,
    strategy: &dyn ComparisonStrategy,
) -> Result<MatchResult, CompareError> {
    let distance = a.distance(b)?;
    Ok(MatchResult {
        distance,
        similarity_percent: a.similarity(b)?,
        match_type: strategy.classify(distance),
        is_match: strategy.is_match(distance),
    })
}

/// Rank the corpus by distance to `query`.
///
/// Ascending distance; equal distances keep corpus order. With `Some(k)`
/// only the first `k` results are returned (all of them if `k` exceeds the
/// corpus). Any entry of a different length fails the whole ranking.
pub fn rank(
    query: &Fingerprint,
    corpus: &[CorpusEntry],
    k: Option<usize>,
) -> Result<Vec<RankedResult>, CompareError> {
    let distances = corpus
        .iter()
        .map(|entry| query.distance(&entry.fingerprint))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(order_by_distance(corpus, distances, k))
}

/// [`rank`] with distances computed on the rayon thread pool.
///
/// Distances are collected in corpus order and sorted on the calling
/// thread, so the result is identical to [`rank`].
pub fn rank_parallel(
    query: &Fingerprint,
    corpus: &[CorpusEntry],
    k: Option<usize>,
) -> Result<Vec<RankedResult>, CompareError> {
    let distances = corpus
        .par_iter()
        .map(|entry| query.distance(&entry.fingerprint))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(order_by_distance(corpus, distances, k))
}

fn order_by_distance(
    corpus: &[CorpusEntry],
    distances: Vec<u32>,
    k: Option<usize>,
) -> Vec<RankedResult> {
    // (distance, corpus index) keys are unique, so any sort of them
    // gives exactly the order of a stable sort by distance.
    let mut keyed: Vec<(u32, usize)> = distances
        .into_iter()
        .enumerate()
        .map(|(index, distance)| (distance, index))
        .collect();

    let limit = k.unwrap_or(keyed.len()).min(keyed.len());
    if limit == 0 {
        return Vec::new();
    }
    if limit < keyed.len() {
        keyed.select_nth_unstable(limit - 1);
        keyed.truncate(limit);
    }
    keyed.sort_unstable();

    debug!(candidates = corpus.len(), returned = keyed.len(), "ranked corpus");

    keyed
        .into_iter()
        .map(|(distance, index)| {
            let entry = &corpus[index];
            RankedResult {
                identifier: entry.identifier.clone(),
                fingerprint: entry.fingerprint.clone(),
                distance,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(identifier: &str, bits: &str) -> CorpusEntry {
        CorpusEntry::new(identifier, bits.parse().unwrap())
    }

    fn query() -> Fingerprint {
        "0000000000".parse().unwrap()
    }

    /// Distances 5, 0, 3 from the all-zero query
    fn corpus() -> Vec<CorpusEntry> {
        vec![
            entry("five.jpg", "1111100000"),
            entry("zero.jpg", "0000000000"),
            entry("three.jpg", "0000000111"),
        ]
    }

    fn identifiers(results: &[RankedResult]) -> Vec<&str> {
        results.iter().map(|r| r.identifier.as_str()).collect()
    }

    #[test]
    fn rank_orders_by_ascending_distance() {
        let results = rank(&query(), &corpus(), None).unwrap();

        assert_eq!(identifiers(&results), ["zero.jpg", "three.jpg", "five.jpg"]);
        let distances: Vec<_> = results.iter().map(|r| r.distance).collect();
        assert_eq!(distances, [0, 3, 5]);
        assert!((results[1].similarity_percent() - 70.0).abs() < 1e-9);
        assert_eq!(results[2].match_type(), MatchType::Similar);
    }

    #[test]
    fn rank_truncates_to_k() {
        let results = rank(&query(), &corpus(), Some(2)).unwrap();
        assert_eq!(identifiers(&results), ["zero.jpg", "three.jpg"]);
    }

    #[test]
    fn k_beyond_corpus_returns_everything() {
        assert_eq!(rank(&query(), &corpus(), Some(50)).unwrap().len(), 3);
    }

    #[test]
    fn k_zero_returns_nothing() {
        assert!(rank(&query(), &corpus(), Some(0)).unwrap().is_empty());
    }

    #[test]
    fn empty_corpus_ranks_to_empty() {
        assert!(rank(&query(), &[], Some(3)).unwrap().is_empty());
    }

    #[test]
    fn ties_keep_corpus_order() {
        let corpus = vec![
            entry("b", "1000000000"),
            entry("a", "0100000000"),
            entry("c", "0000000000"),
            entry("d", "0010000000"),
        ];

        let all = rank(&query(), &corpus, None).unwrap();
        assert_eq!(identifiers(&all), ["c", "b", "a", "d"]);

        let top = rank(&query(), &corpus, Some(3)).unwrap();
        assert_eq!(identifiers(&top), ["c", "b", "a"]);
    }

    #[test]
    fn partial_selection_matches_full_stable_sort() {
        let corpus: Vec<_> = (0..200u32)
            .map(|i| {
                let bits: String = (0..10)
                    .map(|b| if (i * 7 + b * 3) % 11 < 4 { '1' } else { '0' })
                    .collect();
                entry(&format!("img_{i}"), &bits)
            })
            .collect();

        let mut expected: Vec<_> = corpus
            .iter()
            .map(|e| (query().distance(&e.fingerprint).unwrap(), e.identifier.clone()))
            .collect();
        expected.sort_by_key(|(d, _)| *d);

        for k in [1, 7, 50, 199, 200] {
            let ranked: Vec<_> = rank(&query(), &corpus, Some(k))
                .unwrap()
                .into_iter()
                .map(|r| (r.distance, r.identifier))
                .collect();
            assert_eq!(ranked, expected[..k]);
        }
    }

    #[test]
    fn parallel_rank_matches_sequential() {
        let corpus = corpus();
        assert_eq!(
            rank_parallel(&query(), &corpus, Some(2)).unwrap(),
            rank(&query(), &corpus, Some(2)).unwrap()
        );
    }

    #[test]
    fn mismatched_entry_fails_the_ranking() {
        let mut corpus = corpus();
        corpus.push(entry("short.jpg", "0101"));

        assert_eq!(
            rank(&query(), &corpus, None),
            Err(CompareError::LengthMismatch { left: 10, right: 4 })
        );
    }

    #[test]
    fn compare_applies_strategy() {
        let a: Fingerprint = "1111111111".parse().unwrap();
        let b: Fingerprint = "1111111000".parse().unwrap();

        let result = compare(&a, &b, &ThresholdStrategy::new(3)).unwrap();
        assert_eq!(result.distance, 3);
        assert!(result.is_match);
        assert_eq!(result.match_type, MatchType::NearExact);
        assert!((result.similarity_percent - 70.0).abs() < 1e-9);
    }

    #[test]
    fn distance_function_delegates() {
        let a: Fingerprint = "1010".parse().unwrap();
        let b: Fingerprint = "0110".parse().unwrap();
        assert_eq!(distance(&a, &b), Ok(2));
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn match_type_from_distance() {
        assert_eq!(MatchType::from_distance(0), MatchType::Exact);
        assert_eq!(MatchType::from_distance(3), MatchType::NearExact);
        assert_eq!(MatchType::from_distance(7), MatchType::Similar);
        assert_eq!(MatchType::from_distance(12), MatchType::MaybeSimilar);
        assert_eq!(MatchType::from_distance(30), MatchType::Different);
    }
}

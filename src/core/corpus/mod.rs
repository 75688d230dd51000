//! # Corpus Module
//!
//! The set of known fingerprints a query is ranked against.
//!
//! A corpus keeps entries in insertion order (ties in a ranking resolve
//! by that order), rejects duplicate identifiers and requires every
//! fingerprint to have the same bit length.
//!
//! ## Example
//! ```rust,ignore
//! use phash_ranker::core::corpus::Corpus;
//!
//! let corpus = Corpus::load("photos.corpus")?;
//! let nearest = corpus.rank(&query, Some(12))?;
//! ```

mod format;

pub use format::{parse_entries, write_entries};

use crate::core::comparator::{self, RankedResult};
use crate::core::hasher::Fingerprint;
use crate::error::{CompareError, CorpusError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

/// A named fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub identifier: String,
    pub fingerprint: Fingerprint,
}

impl CorpusEntry {
    pub fn new(identifier: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            identifier: identifier.into(),
            fingerprint,
        }
    }
}

/// Ordered, validated collection of corpus entries
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
    /// identifier -> position in `entries`
    index: HashMap<String, usize>,
}

impl Corpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from entries, validating identifiers and lengths
    pub fn from_entries(entries: impl IntoIterator<Item = CorpusEntry>) -> Result<Self, CorpusError> {
        let mut corpus = Self::new();
        for entry in entries {
            corpus.push(entry)?;
        }
        Ok(corpus)
    }

    /// Append an entry
    pub fn push(&mut self, entry: CorpusEntry) -> Result<(), CorpusError> {
        if entry.identifier.is_empty() || entry.identifier.contains(['\n', '\r']) {
            return Err(CorpusError::InvalidIdentifier {
                identifier: entry.identifier,
            });
        }

        if let Some(expected) = self.bit_len() {
            if entry.fingerprint.len() != expected {
                return Err(CorpusError::LengthMismatch {
                    identifier: entry.identifier,
                    expected,
                    actual: entry.fingerprint.len(),
                });
            }
        }

        if self.index.contains_key(&entry.identifier) {
            return Err(CorpusError::DuplicateIdentifier {
                identifier: entry.identifier,
            });
        }

        self.index.insert(entry.identifier.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Append all entries of another corpus
    pub fn extend(&mut self, other: Corpus) -> Result<(), CorpusError> {
        for entry in other.entries {
            self.push(entry)?;
        }
        Ok(())
    }

    /// Parse corpus text
    pub fn parse(text: &str) -> Result<Self, CorpusError> {
        Self::from_entries(parse_entries(text)?)
    }

    /// Load a corpus file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let corpus = Self::parse(&text)?;
        info!(path = %path.display(), entries = corpus.len(), "loaded corpus");
        Ok(corpus)
    }

    /// Write the corpus to a file, replacing it
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CorpusError> {
        let path = path.as_ref();
        let io_error = |source: std::io::Error| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_error)?;
        write_entries(&self.entries, BufWriter::new(file)).map_err(io_error)?;

        debug!(path = %path.display(), entries = self.len(), "saved corpus");
        Ok(())
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Look up an entry by identifier
    pub fn get(&self, identifier: &str) -> Option<&CorpusEntry> {
        self.index.get(identifier).map(|&position| &self.entries[position])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bit length shared by all entries, `None` while empty
    pub fn bit_len(&self) -> Option<usize> {
        self.entries.first().map(|e| e.fingerprint.len())
    }

    /// Rank this corpus against a query; see [`comparator::rank`]
    pub fn rank(
        &self,
        query: &Fingerprint,
        k: Option<usize>,
    ) -> Result<Vec<RankedResult>, CompareError> {
        comparator::rank(query, &self.entries, k)
    }
}

impl IntoIterator for Corpus {
    type Item = CorpusEntry;
    type IntoIter = std::vec::IntoIter<CorpusEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

//! # Error Module
//!
//! Error types for fingerprinting and ranking.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, line numbers, what went wrong
//! - **Report per item** - a failed image in a batch does not hide the others

use std::path::PathBuf;
use thiserror::Error;

/// Top-level library error
#[derive(Error, Debug)]
pub enum PhashError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write output: {0}")]
    Output(String),
}

/// Errors that occur while discovering image files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while fingerprinting a single image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fingerprint computation failed: {0}")]
    ComputationFailed(String),

    #[error("Fingerprinting was cancelled")]
    Cancelled,
}

impl HashError {
    /// Attach a path to errors raised before the source path was known
    /// (e.g. while decoding an in-memory buffer read from that path).
    pub fn with_path(self, path: &std::path::Path) -> Self {
        match self {
            HashError::DecodeError { reason, .. } => HashError::DecodeError {
                path: path.to_path_buf(),
                reason,
            },
            HashError::EmptyImage { .. } => HashError::EmptyImage {
                path: path.to_path_buf(),
            },
            other => other,
        }
    }
}

/// Errors that occur when comparing fingerprints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error(
        "Fingerprint length mismatch: {left} bits vs {right} bits. \
         Both fingerprints must come from the same hasher configuration."
    )]
    LengthMismatch { left: usize, right: usize },

    #[error("Invalid threshold: {value} (must be 0-{bits})")]
    InvalidThreshold { value: u32, bits: usize },
}

/// Errors that occur when parsing a fingerprint bit string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFingerprintError {
    #[error("Fingerprint string is empty")]
    Empty,

    #[error("Invalid character {found:?} at position {position} (expected '0' or '1')")]
    InvalidCharacter { position: usize, found: char },
}

/// Invalid hasher configuration or mismatched matrix dimensions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Transform size must be between 2 and 1024, got {size}")]
    InvalidSize { size: usize },

    #[error("Block size must be between 2 and the transform size {size}, got {block_size}")]
    InvalidBlockSize { block_size: usize, size: usize },

    #[error("Matrix is {actual}x{actual} but this transform expects {expected}x{expected}")]
    MatrixSizeMismatch { expected: usize, actual: usize },

    #[error("Matrix of size {size} needs {expected} values, got {actual}")]
    MatrixValueCount {
        size: usize,
        expected: usize,
        actual: usize,
    },
}

/// Errors that occur while building, loading or saving a corpus
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Malformed corpus line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Duplicate identifier in corpus: {identifier}")]
    DuplicateIdentifier { identifier: String },

    #[error("Identifier {identifier:?} cannot be stored on one corpus line")]
    InvalidIdentifier { identifier: String },

    #[error("Entry {identifier} has {actual} bits, corpus fingerprints have {expected}")]
    LengthMismatch {
        identifier: String,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to access corpus file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PhashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_error_includes_path() {
        let error = HashError::DecodeError {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn with_path_fills_in_decode_errors() {
        let error = HashError::DecodeError {
            path: PathBuf::new(),
            reason: "truncated".to_string(),
        }
        .with_path(std::path::Path::new("/photos/a.png"));

        assert!(error.to_string().contains("/photos/a.png"));
    }

    #[test]
    fn length_mismatch_names_both_lengths() {
        let error = CompareError::LengthMismatch { left: 63, right: 49 };
        let message = error.to_string();
        assert!(message.contains("63"));
        assert!(message.contains("49"));
    }

    #[test]
    fn corpus_parse_error_includes_line() {
        let error = CorpusError::Parse {
            line: 7,
            reason: "missing fingerprint".to_string(),
        };
        assert!(error.to_string().contains("line 7"));
    }

    #[test]
    fn errors_convert_into_top_level() {
        let error: PhashError = ConfigError::InvalidSize { size: 0 }.into();
        assert!(matches!(error, PhashError::Config(_)));
    }
}

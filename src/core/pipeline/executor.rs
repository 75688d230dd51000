//! Pipeline execution implementation.

use super::batch::{fingerprint_batch, CancellationToken, FailurePolicy};
use crate::core::corpus::{Corpus, CorpusEntry};
use crate::core::hasher::{HasherConfig, ImageHasher};
use crate::core::scanner::{ImageScanner, ScanConfig, WalkDirScanner};
use crate::error::{HashError, PhashError};
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// An image (or scan root) that did not make it into the corpus
#[derive(Debug)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub error: PhashError,
}

/// Result of an indexing run
#[derive(Debug)]
pub struct IndexResult {
    /// Fingerprints of every image that succeeded, in scan order
    pub corpus: Corpus,
    /// Per-item failures (only under [`FailurePolicy::Skip`])
    pub failures: Vec<ItemFailure>,
    /// Image files discovered by the scan
    pub total_images: usize,
    /// Whether the run was stopped through the cancellation token
    pub cancelled: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Directories (or single files) to index
    pub paths: Vec<PathBuf>,
    /// Fingerprint parameters
    pub hasher_config: HasherConfig,
    /// Scanner configuration
    pub scan_config: ScanConfig,
    /// What to do when an image fails
    pub failure_policy: FailurePolicy,
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    hasher: Option<Arc<dyn ImageHasher>>,
    cancellation: Option<CancellationToken>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directories to scan
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.paths = paths;
        self
    }

    /// Set the fingerprint parameters
    pub fn hasher_config(mut self, config: HasherConfig) -> Self {
        self.config.hasher_config = config;
        self
    }

    /// Use a custom hasher instead of building one from the hasher config
    pub fn hasher(mut self, hasher: Arc<dyn ImageHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Set the failure policy
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Share a cancellation token with the caller
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            hasher: self.hasher,
            cancellation: self.cancellation.unwrap_or_default(),
        }
    }
}

/// Scan, fingerprint and collect images into a corpus
pub struct Pipeline {
    config: PipelineConfig,
    hasher: Option<Arc<dyn ImageHasher>>,
    cancellation: CancellationToken,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The token that cancels this pipeline
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<IndexResult, PhashError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<IndexResult, PhashError> {
        let result = self.execute(events);
        if let Err(e) = &result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    fn execute(&self, events: &EventSender) -> Result<IndexResult, PhashError> {
        let start_time = Instant::now();
        let abort = self.config.failure_policy == FailurePolicy::Abort;
        let mut failures = Vec::new();

        let hasher: Arc<dyn ImageHasher> = match &self.hasher {
            Some(hasher) => Arc::clone(hasher),
            None => Arc::new(self.config.hasher_config.build()?),
        };

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan_result = scanner.scan_with_events(&self.config.paths, events)?;

        for error in scan_result.errors {
            if abort {
                return Err(error.into());
            }
            failures.push(ItemFailure {
                path: scan_error_path(&error),
                error: error.into(),
            });
        }

        let images = scan_result.images;
        let total_images = images.len();

        // Phase 2: Fingerprinting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));

        let paths: Vec<PathBuf> = images.iter().map(|image| image.path.clone()).collect();
        let outcomes = fingerprint_batch(
            hasher.as_ref(),
            &paths,
            self.config.failure_policy,
            &self.cancellation,
            events,
        );

        // Phase 3: Indexing, in scan order
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Indexing,
        }));

        let mut corpus = Corpus::new();
        let mut first_failure = None;

        for (image, (path, outcome)) in images.iter().zip(outcomes) {
            let error: PhashError = match outcome {
                Ok(fingerprint) => {
                    match corpus.push(CorpusEntry::new(image.identifier(), fingerprint)) {
                        Ok(()) => continue,
                        Err(e) => e.into(),
                    }
                }
                Err(HashError::Cancelled) => continue,
                Err(e) => e.into(),
            };

            if abort {
                first_failure.get_or_insert(error);
            } else {
                failures.push(ItemFailure { path, error });
            }
        }

        if let Some(error) = first_failure {
            return Err(error);
        }

        let cancelled = self.cancellation.is_cancelled();
        let duration_ms = start_time.elapsed().as_millis() as u64;

        if cancelled {
            warn!(indexed = corpus.len(), total_images, "indexing cancelled");
            events.send(Event::Pipeline(PipelineEvent::Cancelled));
        } else {
            info!(
                indexed = corpus.len(),
                failed = failures.len(),
                duration_ms,
                "indexing complete"
            );
            events.send(Event::Pipeline(PipelineEvent::Completed {
                summary: PipelineSummary {
                    total_images,
                    indexed: corpus.len(),
                    failed: failures.len(),
                    duration_ms,
                },
            }));
        }

        Ok(IndexResult {
            corpus,
            failures,
            total_images,
            cancelled,
            duration_ms,
        })
    }
}

fn scan_error_path(error: &crate::error::ScanError) -> PathBuf {
    use crate::error::ScanError;
    match error {
        ScanError::DirectoryNotFound { path }
        | ScanError::PermissionDenied { path }
        | ScanError::ReadDirectory { path, .. } => path.clone(),
    }
}

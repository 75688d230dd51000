//! Parallel fingerprinting of a list of files.

use crate::core::hasher::{Fingerprint, ImageHasher};
use crate::error::HashError;
use crate::events::{Event, EventSender, HashEvent, HashProgress};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Cooperative cancellation flag shared between a caller and a running batch.
///
/// Cancelling never interrupts an image mid-computation; images that have
/// not started yet report [`HashError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// What a batch does when one image fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and keep going
    #[default]
    Skip,
    /// Stop starting new images after the first failure
    Abort,
}

/// Outcome of one image in a batch
pub type BatchItem = (PathBuf, Result<Fingerprint, HashError>);

/// Fingerprint `paths` on the rayon pool.
///
/// Returns one outcome per input path, in input order.
pub fn fingerprint_batch(
    hasher: &dyn ImageHasher,
    paths: &[PathBuf],
    policy: FailurePolicy,
    cancel: &CancellationToken,
    events: &EventSender,
) -> Vec<BatchItem> {
    let total = paths.len();
    let completed = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let aborted = AtomicBool::new(false);

    events.send(Event::Hash(HashEvent::Started {
        total_images: total,
    }));

    let outcomes: Vec<BatchItem> = paths
        .par_iter()
        .map(|path| {
            if cancel.is_cancelled() || aborted.load(Ordering::SeqCst) {
                return (path.clone(), Err(HashError::Cancelled));
            }

            let outcome = hasher.hash_file(path);
            match &outcome {
                Ok(fingerprint) => {
                    debug!(path = %path.display(), bits = fingerprint.len(), "fingerprinted");
                }
                Err(e) => {
                    warn!(path = %path.display(), "{e}");
                    failed.fetch_add(1, Ordering::SeqCst);
                    if policy == FailurePolicy::Abort {
                        aborted.store(true, Ordering::SeqCst);
                    }
                    events.send(Event::Hash(HashEvent::Error {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                }
            }

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            events.send(Event::Hash(HashEvent::Progress(HashProgress {
                completed: done,
                total,
                current_path: path.clone(),
            })));

            (path.clone(), outcome)
        })
        .collect();

    let failed = failed.load(Ordering::SeqCst);
    events.send(Event::Hash(HashEvent::Completed {
        total_hashed: completed.load(Ordering::SeqCst) - failed,
        failed,
    }));

    outcomes
}

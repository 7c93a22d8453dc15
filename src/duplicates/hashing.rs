//! Hash phase: fill in content hashes for candidate size classes.
//!
//! # Overview
//!
//! The scan phase only records sizes; this phase turns size-class
//! candidates into comparable content identities. For every size that
//! occurs on two or more records, each record without a hash is read and
//! BLAKE3-hashed, and the digests for that size class are committed in a
//! single transaction.
//!
//! Records that fail to read (vanished, unreadable) are logged and left
//! with a NULL hash for the rest of the run; they simply never join a hash
//! group. Because only NULL-hash rows are selected, a re-run after an
//! interruption re-hashes nothing that was already committed.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indicatif::ProgressBar;

use crate::catalog::{Catalog, CatalogError};
use crate::scanner::hash_file;

/// Configuration for the hash phase.
#[derive(Default)]
pub struct HashConfig {
    /// Optional cancellation flag polled before each file
    cancel_flag: Option<Arc<AtomicBool>>,
    /// Optional progress bar advanced per size class
    progress: Option<ProgressBar>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("cancel_flag", &self.cancel_flag)
            .field("progress", &self.progress.as_ref().map(|_| "<progress>"))
            .finish()
    }
}

impl HashConfig {
    /// Set the cancellation flag polled before each file.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Attach a progress bar sized to the number of candidate classes.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the hash phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashPhaseStats {
    /// Size classes that were offered to the phase
    pub candidate_classes: usize,
    /// Size classes fully processed and committed
    pub classes_completed: usize,
    /// Files successfully hashed in this run
    pub hashed: u64,
    /// Files skipped because they could not be read
    pub skipped: u64,
    /// Whether the phase stopped early on cancellation
    pub interrupted: bool,
}

/// Hash every unhashed record in the given size classes.
///
/// Digests are committed once per size class, so the class is either
/// absent from the catalog's hash column or complete (minus unreadable
/// files) after each commit. Cancellation is observed before each file;
/// the digests already computed for the current class are committed
/// before returning, and the function returns normally with
/// [`HashPhaseStats::interrupted`] set.
///
/// # Errors
///
/// Only catalog failures are returned; per-file read errors are logged
/// and counted in [`HashPhaseStats::skipped`].
pub fn hash_candidates(
    catalog: &Catalog,
    sizes: &[u64],
    config: &HashConfig,
) -> Result<HashPhaseStats, CatalogError> {
    let mut stats = HashPhaseStats {
        candidate_classes: sizes.len(),
        ..Default::default()
    };

    if sizes.is_empty() {
        log::debug!("no candidate size classes, nothing to hash");
        return Ok(stats);
    }

    log::info!("hashing {} candidate size classes", sizes.len());

    for &size in sizes {
        if config.is_cancelled() {
            stats.interrupted = true;
            break;
        }

        let rows = catalog.unhashed_of_size(size)?;
        log::debug!("size class {size}: {} unhashed files", rows.len());

        let mut digests: Vec<(i64, String)> = Vec::with_capacity(rows.len());
        let mut cancelled_mid_class = false;

        for (id, path) in rows {
            if config.is_cancelled() {
                cancelled_mid_class = true;
                break;
            }

            match hash_file(Path::new(&path)) {
                Ok(digest) => {
                    digests.push((id, digest));
                    stats.hashed += 1;
                }
                Err(err) => {
                    log::warn!("skipping {path}: {err}");
                    stats.skipped += 1;
                }
            }
        }

        // One commit per class, complete or cut short by cancellation
        catalog.set_hashes(&digests)?;

        if cancelled_mid_class {
            stats.interrupted = true;
            break;
        }

        stats.classes_completed += 1;
        if let Some(progress) = &config.progress {
            progress.inc(1);
            progress.set_message(format!("{} files hashed", stats.hashed));
        }
    }

    log::info!(
        "hash phase finished: {}/{} classes, {} hashed, {} skipped{}",
        stats.classes_completed,
        stats.candidate_classes,
        stats.hashed,
        stats.skipped,
        if stats.interrupted { " (interrupted)" } else { "" }
    );

    Ok(stats)
}

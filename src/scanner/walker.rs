//! Directory walker that populates the catalog.
//!
//! # Overview
//!
//! [`Scanner`] traverses a directory tree with [`walkdir`] and records every
//! regular file into the catalog: path, size, and modification time, with
//! the hash column left NULL for the hash phase. Traversal is synchronous
//! and single-threaded; the catalog transaction batching, not the walk, is
//! what keeps large scans fast.
//!
//! Rows are staged in memory and committed every [`DEFAULT_BATCH_SIZE`]
//! files. Paths already present in the catalog are left untouched, so
//! re-scanning after an interruption converges instead of duplicating rows.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::catalog::Catalog;
//! use dupsweep::scanner::Scanner;
//! use std::path::Path;
//!
//! let catalog = Catalog::open(Path::new("duplicates.db"))?;
//! let stats = Scanner::new(Path::new("/data")).scan(&catalog)?;
//! println!("{} seen, {} new", stats.seen, stats.inserted);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use indicatif::ProgressBar;
use walkdir::WalkDir;

use super::ScanError;
use crate::catalog::{Catalog, NewRecord};

/// How many staged rows trigger a catalog commit.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Counters reported by a scan run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Regular files encountered and staged for the catalog.
    pub seen: u64,
    /// Rows that were actually new to the catalog.
    pub inserted: u64,
    /// Entries skipped because of I/O errors or unusable paths.
    pub skipped: u64,
    /// Whether the walk stopped early on cancellation.
    pub interrupted: bool,
}

/// Recursive file discovery feeding the catalog.
pub struct Scanner {
    /// Root path to walk
    root: PathBuf,
    /// Staged rows per catalog transaction
    batch_size: usize,
    /// Optional cancellation flag polled before each entry
    cancel_flag: Option<Arc<AtomicBool>>,
    /// Optional spinner updated as the walk progresses
    progress: Option<ProgressBar>,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("root", &self.root)
            .field("batch_size", &self.batch_size)
            .field("cancel_flag", &self.cancel_flag)
            .field("progress", &self.progress.as_ref().map(|_| "<progress>"))
            .finish()
    }
}

impl Scanner {
    /// Create a scanner for the given root directory.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            batch_size: DEFAULT_BATCH_SIZE,
            cancel_flag: None,
            progress: None,
        }
    }

    /// Override the commit interval. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the cancellation flag polled before each directory entry.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Attach a progress spinner.
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

    /// Walk the tree and record every regular file into `catalog`.
    ///
    /// Directories, special files, and dangling symlinks are skipped
    /// silently; a symlink to a regular file is recorded under the link
    /// path with the target's metadata. Entries that fail to stat and
    /// paths that are not valid UTF-8 are skipped with a warning and
    /// counted in [`ScanStats::skipped`].
    ///
    /// On cancellation the staged batch is flushed and the stats come back
    /// with `interrupted` set; the catalog then holds everything seen so
    /// far and a later re-scan picks up the remainder.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the root is missing, not a directory, or
    /// unreadable, or if a catalog commit fails.
    pub fn scan(&self, catalog: &Catalog) -> Result<ScanStats, ScanError> {
        self.validate_root()?;

        let mut stats = ScanStats::default();
        let mut pending: Vec<NewRecord> = Vec::with_capacity(self.batch_size);

        log::debug!("scanning {} (batch size {})", self.root.display(), self.batch_size);

        for entry_result in WalkDir::new(&self.root).follow_links(false) {
            if self.is_cancelled() {
                log::debug!("scan cancelled, flushing staged batch");
                stats.interrupted = true;
                break;
            }

            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("skipping entry: {err}");
                    stats.skipped += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }

            let path = entry.path();
            let metadata = if file_type.is_symlink() {
                // Follow the link; a dangling or non-file target is not ours
                match std::fs::metadata(path) {
                    Ok(meta) if meta.is_file() => meta,
                    Ok(_) => {
                        log::trace!("skipping symlink to non-file: {}", path.display());
                        continue;
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                        log::trace!("skipping dangling symlink: {}", path.display());
                        continue;
                    }
                    Err(err) => {
                        log::warn!("skipping {}: {err}", path.display());
                        stats.skipped += 1;
                        continue;
                    }
                }
            } else if file_type.is_file() {
                match entry.metadata() {
                    Ok(meta) => meta,
                    Err(err) => {
                        log::warn!("skipping {}: {err}", path.display());
                        stats.skipped += 1;
                        continue;
                    }
                }
            } else {
                // Sockets, fifos, devices
                log::trace!("skipping special file: {}", path.display());
                continue;
            };

            let Some(path_str) = path.to_str() else {
                log::warn!("skipping non-UTF-8 path: {}", path.display());
                stats.skipped += 1;
                continue;
            };

            pending.push(NewRecord {
                path: path_str.to_string(),
                size: metadata.len(),
                mtime_ns: mtime_nanos(&metadata),
            });
            stats.seen += 1;

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }

            if pending.len() >= self.batch_size {
                stats.inserted += catalog.insert_batch(&pending)? as u64;
                pending.clear();
                if let Some(progress) = &self.progress {
                    progress.set_message(format!("{} files recorded", stats.seen));
                }
            }
        }

        // Final flush covers the tail batch and the cancellation path
        stats.inserted += catalog.insert_batch(&pending)? as u64;

        log::info!(
            "scan of {} finished: {} seen, {} new, {} skipped{}",
            self.root.display(),
            stats.seen,
            stats.inserted,
            stats.skipped,
            if stats.interrupted { " (interrupted)" } else { "" }
        );

        Ok(stats)
    }

    fn validate_root(&self) -> Result<(), ScanError> {
        let metadata = std::fs::metadata(&self.root).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => ScanError::NotFound(self.root.clone()),
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(self.root.clone()),
            _ => ScanError::Io {
                path: self.root.clone(),
                source: err,
            },
        })?;

        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        Ok(())
    }
}

/// Modification time as nanoseconds since the Unix epoch. Files with an
/// unreadable or pre-epoch mtime clamp to 0.
pub(crate) fn mtime_nanos(metadata: &Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos().min(i64::MAX as u128) as i64)
}

//! Disposal of duplicate files.
//!
//! # Overview
//!
//! Once the resolver has picked a survivor for a duplicate group, every
//! other record becomes a disposal target. What happens to a target is
//! governed by a single [`DisposalStrategy`] for the whole run:
//! - [`DisposalStrategy::DryRun`] reports without touching the filesystem
//! - [`DisposalStrategy::Quarantine`] moves the file into a directory,
//!   keeping its base name (an existing file of the same name is
//!   overwritten; last writer wins)
//! - [`DisposalStrategy::Delete`] removes the file permanently
//!
//! The quarantine directory is not created implicitly; a missing or
//! unwritable directory shows up as per-target failures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// How to handle a duplicate once a survivor is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisposalStrategy {
    /// Report what would be removed without mutating anything.
    DryRun,
    /// Move the file into this directory, preserving its base name.
    Quarantine(PathBuf),
    /// Remove the file permanently.
    Delete,
}

/// What actually happened to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Dry run: the file would have been removed.
    WouldRemove,
    /// The file was moved to this quarantine destination.
    Moved(PathBuf),
    /// The file was permanently removed.
    Removed,
}

/// Error type for disposal operations.
#[derive(Debug, Error)]
pub enum DisposeError {
    /// The target vanished between hashing and disposal.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied on the target or its parent directory.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The target path has no base name to carry into quarantine.
    #[error("cannot quarantine {0}: path has no file name")]
    NoFileName(PathBuf),

    /// Moving into quarantine failed.
    #[error("failed to move {path} to {dest}: {source}")]
    Move {
        path: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permanent removal failed.
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DisposeError {
    /// Get the target path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NoFileName(p)
            | Self::Move { path: p, .. }
            | Self::Remove { path: p, .. } => p,
        }
    }
}

/// Apply the run's strategy to one disposal target.
///
/// # Errors
///
/// Returns [`DisposeError`] describing why the target could not be
/// disposed. The caller logs the error and continues with the next target.
pub fn dispose(path: &Path, strategy: &DisposalStrategy) -> Result<Disposition, DisposeError> {
    match strategy {
        DisposalStrategy::DryRun => Ok(Disposition::WouldRemove),
        DisposalStrategy::Quarantine(dir) => quarantine(path, dir),
        DisposalStrategy::Delete => remove(path),
    }
}

fn remove(path: &Path) -> Result<Disposition, DisposeError> {
    fs::remove_file(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => DisposeError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DisposeError::PermissionDenied(path.to_path_buf()),
        _ => DisposeError::Remove {
            path: path.to_path_buf(),
            source: err,
        },
    })?;
    Ok(Disposition::Removed)
}

fn quarantine(path: &Path, dir: &Path) -> Result<Disposition, DisposeError> {
    let name = path
        .file_name()
        .ok_or_else(|| DisposeError::NoFileName(path.to_path_buf()))?;
    let dest = dir.join(name);

    // Rename when possible; copy-then-remove covers cross-device moves and
    // platforms where rename refuses to replace an existing destination.
    match fs::rename(path, &dest) {
        Ok(()) => Ok(Disposition::Moved(dest)),
        Err(rename_err) => {
            log::trace!(
                "rename of {} to {} failed ({rename_err}), falling back to copy",
                path.display(),
                dest.display()
            );
            if let Err(copy_err) = fs::copy(path, &dest) {
                return Err(classify_move(path, &dest, copy_err));
            }
            remove(path)?;
            Ok(Disposition::Moved(dest))
        }
    }
}

fn classify_move(path: &Path, dest: &Path, source: io::Error) -> DisposeError {
    // NotFound is ambiguous between a vanished source and a missing
    // quarantine directory; only blame the source when it is actually gone
    if source.kind() == io::ErrorKind::NotFound && !path.exists() {
        DisposeError::NotFound(path.to_path_buf())
    } else if source.kind() == io::ErrorKind::PermissionDenied {
        DisposeError::PermissionDenied(path.to_path_buf())
    } else {
        DisposeError::Move {
            path: path.to_path_buf(),
            dest: dest.to_path_buf(),
            source,
        }
    }
}

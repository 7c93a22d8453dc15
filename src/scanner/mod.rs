//! Scanner module for directory traversal and file hashing.
//!
//! The scanner is divided into submodules:
//! - [`walker`]: recursive file discovery that populates the catalog in
//!   batched transactions
//! - [`hasher`]: streaming BLAKE3 content hashing
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::catalog::Catalog;
//! use dupsweep::scanner::Scanner;
//! use std::path::Path;
//!
//! let catalog = Catalog::open(Path::new("duplicates.db"))?;
//! let stats = Scanner::new(Path::new("/home/user/Downloads")).scan(&catalog)?;
//! println!("{} files recorded", stats.seen);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;

use crate::catalog::CatalogError;

// Re-export main types
pub use hasher::{hash_file, HASH_CHUNK_SIZE};
pub use walker::{ScanStats, Scanner};

/// Errors that abort the scan phase.
///
/// Per-entry problems (unreadable subtrees, vanished files) are logged and
/// skipped, never returned; only an unusable root or a failing catalog stops
/// the scan.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Permission was denied when accessing the scan root.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while accessing the scan root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The catalog stopped accepting writes.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors that can occur while hashing a single file.
///
/// These never abort the hash phase; the affected record keeps a NULL hash
/// and the failure is logged.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file was not found (deleted since the scan).
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error against the path it occurred on.
    #[must_use]
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

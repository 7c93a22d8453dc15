//! Persistent scan catalog.
//!
//! Every phase of the pipeline reads and writes one SQLite database, the
//! catalog, which holds a row per discovered file: path (unique key), size,
//! modification time, and a content hash that starts out NULL and is filled
//! in by the hash phase. The catalog is what makes the phases resumable:
//! a re-run of any phase picks up exactly the rows the previous run left
//! unfinished.
//!
//! Rows are only ever inserted by the scan phase and updated (hash column,
//! once) by the hash phase. The clean phase treats the catalog as read-only;
//! records for disposed files stay behind until an explicit purge removes
//! rows whose paths no longer exist.

use std::path::PathBuf;

use thiserror::Error;

pub mod database;

pub use database::Catalog;

/// Default catalog file name, created in the working directory.
pub const DEFAULT_CATALOG_NAME: &str = "duplicates.db";

/// A fully materialized catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Row id, used to address the record when setting its hash.
    pub id: i64,
    /// File path as recorded by the scanner (unique key).
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch.
    pub mtime_ns: i64,
    /// Hex content hash, NULL until the hash phase fills it in.
    pub hash: Option<String>,
}

/// A row staged for insertion by the scanner. The hash column starts NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub path: String,
    pub size: u64,
    pub mtime_ns: i64,
}

/// Errors from opening or operating on the catalog.
///
/// An `Open` error is fatal to the run; everything else surfaces through
/// the phase drivers, which also treat storage failures as fatal (a catalog
/// that stops accepting writes cannot guarantee resumability).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be opened or its schema initialized.
    #[error("failed to open catalog {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A query or transaction against the catalog failed.
    #[error("catalog operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

//! Clean phase: pick survivors and dispose the rest.
//!
//! # Overview
//!
//! A duplicate group is every catalog record sharing one content hash.
//! Within a group the record with the newest modification time survives;
//! ties are broken by the smallest path, so the outcome is identical no
//! matter what order files were discovered in. All other records are
//! disposal targets handled by the run's [`DisposalStrategy`].
//!
//! Failures are isolated per target: a file that vanished or cannot be
//! moved is logged and counted, and the remaining targets and groups are
//! still processed. The catalog itself is never modified here; records for
//! disposed files stay behind until an explicit purge.

use std::path::Path;

use crate::actions::{dispose, DisposalStrategy, Disposition};
use crate::catalog::{Catalog, CatalogError};

/// Statistics from the clean phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Duplicate groups examined
    pub groups: usize,
    /// Disposals attempted (every non-surviving record)
    pub processed: u64,
    /// Disposals that failed
    pub failed: u64,
    /// Bytes reclaimed, or that would be reclaimed in a dry run
    pub bytes_reclaimed: u64,
}

impl ResolveStats {
    /// Disposals that went through.
    #[must_use]
    pub fn succeeded(&self) -> u64 {
        self.processed - self.failed
    }
}

/// Resolve every duplicate group in the catalog with one strategy.
///
/// Prints one line per disposal action to stdout, as the user-facing
/// record of what happened (or would happen, in a dry run).
///
/// # Errors
///
/// Only catalog read failures are returned; per-target disposal failures
/// are logged and counted in [`ResolveStats::failed`].
pub fn resolve_duplicates(
    catalog: &Catalog,
    strategy: &DisposalStrategy,
) -> Result<ResolveStats, CatalogError> {
    let hashes = catalog.hashes_with_duplicates()?;
    let mut stats = ResolveStats {
        groups: hashes.len(),
        ..Default::default()
    };

    log::info!("resolving {} duplicate groups", hashes.len());

    for hash in &hashes {
        // Records come back newest-first with a stable tie-break, so the
        // head of the list is the survivor.
        let records = catalog.records_for_hash(hash)?;
        let Some((survivor, targets)) = records.split_first() else {
            continue;
        };

        log::debug!("group {hash}: keeping {}", survivor.path);

        for target in targets {
            stats.processed += 1;
            match dispose(Path::new(&target.path), strategy) {
                Ok(Disposition::WouldRemove) => {
                    println!("[dry-run] would remove: {}", target.path);
                    stats.bytes_reclaimed += target.size;
                }
                Ok(Disposition::Moved(dest)) => {
                    println!("Moved: {} -> {}", target.path, dest.display());
                    stats.bytes_reclaimed += target.size;
                }
                Ok(Disposition::Removed) => {
                    println!("Removed: {}", target.path);
                    stats.bytes_reclaimed += target.size;
                }
                Err(err) => {
                    log::warn!("failed to dispose {}: {err}", target.path);
                    stats.failed += 1;
                }
            }
        }
    }

    log::info!(
        "clean finished: {} groups, {} processed, {} failed",
        stats.groups,
        stats.processed,
        stats.failed
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NewRecord;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    /// Insert a hashed record pointing at a real file, with full control of
    /// the recorded mtime and hash.
    fn insert_hashed(catalog: &Catalog, path: &Path, size: u64, mtime_ns: i64, hash: &str) {
        let key = path.to_str().unwrap().to_string();
        catalog
            .insert_batch(&[NewRecord {
                path: key.clone(),
                size,
                mtime_ns,
            }])
            .unwrap();
        let id = catalog.record_for_path(&key).unwrap().unwrap().id;
        catalog.set_hashes(&[(id, hash.to_string())]).unwrap();
    }

    #[test]
    fn test_newest_survives_delete() {
        let tmp = TempDir::new().unwrap();
        let old = write_file(tmp.path(), "old.txt", b"dup");
        let mid = write_file(tmp.path(), "mid.txt", b"dup");
        let new = write_file(tmp.path(), "new.txt", b"dup");

        let catalog = Catalog::open_in_memory().unwrap();
        insert_hashed(&catalog, &old, 3, 100, "h");
        insert_hashed(&catalog, &mid, 3, 200, "h");
        insert_hashed(&catalog, &new, 3, 300, "h");

        let stats = resolve_duplicates(&catalog, &DisposalStrategy::Delete).unwrap();

        assert_eq!(stats.groups, 1);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.bytes_reclaimed, 6);
        assert!(new.exists());
        assert!(!old.exists());
        assert!(!mid.exists());
    }

    #[test]
    fn test_dry_run_disposes_nothing() {
        let tmp = TempDir::new().unwrap();
        let a = write_file(tmp.path(), "a.txt", b"dup");
        let b = write_file(tmp.path(), "b.txt", b"dup");

        let catalog = Catalog::open_in_memory().unwrap();
        insert_hashed(&catalog, &a, 3, 100, "h");
        insert_hashed(&catalog, &b, 3, 200, "h");

        let stats = resolve_duplicates(&catalog, &DisposalStrategy::DryRun).unwrap();

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.bytes_reclaimed, 3);
        assert!(a.exists());
        assert!(b.exists());
    }

    #[test]
    fn test_quarantine_moves_targets() {
        let tmp = TempDir::new().unwrap();
        let trash = tmp.path().join("trash");
        fs::create_dir(&trash).unwrap();
        let a = write_file(tmp.path(), "a.txt", b"dup");
        let b = write_file(tmp.path(), "b.txt", b"dup");

        let catalog = Catalog::open_in_memory().unwrap();
        insert_hashed(&catalog, &a, 3, 100, "h");
        insert_hashed(&catalog, &b, 3, 200, "h");

        let stats =
            resolve_duplicates(&catalog, &DisposalStrategy::Quarantine(trash.clone())).unwrap();

        assert_eq!(stats.succeeded(), 1);
        assert!(b.exists());
        assert!(!a.exists());
        assert!(trash.join("a.txt").exists());
    }

    #[test]
    fn test_equal_mtime_breaks_tie_by_path() {
        let tmp = TempDir::new().unwrap();
        let a = write_file(tmp.path(), "aaa.txt", b"dup");
        let b = write_file(tmp.path(), "bbb.txt", b"dup");

        let catalog = Catalog::open_in_memory().unwrap();
        insert_hashed(&catalog, &a, 3, 500, "h");
        insert_hashed(&catalog, &b, 3, 500, "h");

        resolve_duplicates(&catalog, &DisposalStrategy::Delete).unwrap();

        // Same mtime: the lexicographically smaller path survives
        assert!(a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_failures_are_isolated_per_target() {
        let tmp = TempDir::new().unwrap();
        let survivor_a = write_file(tmp.path(), "keep-a.txt", b"one");
        let gone = tmp.path().join("gone-a.txt");
        let survivor_b = write_file(tmp.path(), "keep-b.txt", b"two");
        let target_b = write_file(tmp.path(), "drop-b.txt", b"two");

        let catalog = Catalog::open_in_memory().unwrap();
        insert_hashed(&catalog, &survivor_a, 3, 200, "ha");
        insert_hashed(&catalog, &gone, 3, 100, "ha");
        insert_hashed(&catalog, &survivor_b, 3, 200, "hb");
        insert_hashed(&catalog, &target_b, 3, 100, "hb");

        let stats = resolve_duplicates(&catalog, &DisposalStrategy::Delete).unwrap();

        // The vanished target fails, the other group is still cleaned
        assert_eq!(stats.groups, 2);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.succeeded(), 1);
        assert!(survivor_a.exists());
        assert!(survivor_b.exists());
        assert!(!target_b.exists());
    }

    #[test]
    fn test_catalog_rows_survive_clean() {
        let tmp = TempDir::new().unwrap();
        let a = write_file(tmp.path(), "a.txt", b"dup");
        let b = write_file(tmp.path(), "b.txt", b"dup");

        let catalog = Catalog::open_in_memory().unwrap();
        insert_hashed(&catalog, &a, 3, 100, "h");
        insert_hashed(&catalog, &b, 3, 200, "h");

        resolve_duplicates(&catalog, &DisposalStrategy::Delete).unwrap();

        // Disposed records stay in the catalog until an explicit purge
        assert_eq!(catalog.file_count().unwrap(), 2);
    }
}

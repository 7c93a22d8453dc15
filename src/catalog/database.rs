//! SQLite-backed implementation of the catalog.

use std::path::Path;

use rusqlite::{params, Connection};

use super::{CatalogError, FileRecord, NewRecord};

/// Handle to the catalog database.
///
/// All methods take `&self`; rusqlite connections are internally
/// synchronized and the pipeline is single-threaded anyway. Batched writes
/// go through explicit transactions so a crash between batches never leaves
/// a half-committed batch behind.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Open (or create) the catalog file at `path` and ensure its schema.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Open`] if the file cannot be opened or the
    /// schema cannot be initialized. This is fatal to the run.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let open = || -> Result<Self, rusqlite::Error> {
            let conn = Connection::open(path)?;
            let catalog = Catalog { conn };
            catalog.configure_pragmas()?;
            catalog.ensure_schema()?;
            Ok(catalog)
        };
        open().map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Open an in-memory catalog. Used by tests and benchmarks.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Open`] if schema initialization fails.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let open = || -> Result<Self, rusqlite::Error> {
            let conn = Connection::open_in_memory()?;
            let catalog = Catalog { conn };
            catalog.configure_pragmas()?;
            catalog.ensure_schema()?;
            Ok(catalog)
        };
        open().map_err(|source| CatalogError::Open {
            path: ":memory:".into(),
            source,
        })
    }

    fn configure_pragmas(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        log::debug!("catalog pragmas configured (WAL mode)");
        Ok(())
    }

    /// Idempotent schema setup; safe to run on every open.
    fn ensure_schema(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files (
                 id       INTEGER PRIMARY KEY,
                 path     TEXT NOT NULL UNIQUE,
                 size     INTEGER NOT NULL,
                 mtime_ns INTEGER NOT NULL,
                 hash     TEXT
             );
             CREATE INDEX IF NOT EXISTS idx_files_size ON files(size);
             CREATE INDEX IF NOT EXISTS idx_files_hash ON files(hash);",
        )?;
        log::debug!("catalog schema ensured");
        Ok(())
    }

    /// Insert a batch of scanned rows in one transaction, skipping paths
    /// that are already recorded. Returns how many rows were actually new.
    pub fn insert_batch(&self, rows: &[NewRecord]) -> Result<usize, CatalogError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO files (path, size, mtime_ns) VALUES (?1, ?2, ?3)",
            )?;
            for row in rows {
                inserted += stmt.execute(params![row.path, row.size as i64, row.mtime_ns])?;
            }
        }
        tx.commit()?;
        log::trace!("committed scan batch of {} rows ({} new)", rows.len(), inserted);
        Ok(inserted)
    }

    /// Sizes that occur on more than one record, ascending. These are the
    /// candidate size classes for the hash phase.
    pub fn sizes_with_duplicates(&self) -> Result<Vec<u64>, CatalogError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT size FROM files GROUP BY size HAVING COUNT(*) > 1 ORDER BY size")?;
        let sizes = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sizes.into_iter().map(|s| s as u64).collect())
    }

    /// `(id, path)` of every record of `size` that has no hash yet, ordered
    /// by path. Already-hashed records are never returned, which is what
    /// makes the hash phase resumable.
    pub fn unhashed_of_size(&self, size: u64) -> Result<Vec<(i64, String)>, CatalogError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, path FROM files WHERE size = ?1 AND hash IS NULL ORDER BY path",
        )?;
        let rows = stmt
            .query_map(params![size as i64], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Store computed digests in one transaction. Each update is guarded
    /// with `hash IS NULL`; a hash, once set, is never overwritten.
    /// Returns how many rows were updated.
    pub fn set_hashes(&self, digests: &[(i64, String)]) -> Result<usize, CatalogError> {
        if digests.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.unchecked_transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx
                .prepare_cached("UPDATE files SET hash = ?1 WHERE id = ?2 AND hash IS NULL")?;
            for (id, hash) in digests {
                updated += stmt.execute(params![hash, id])?;
            }
        }
        tx.commit()?;
        log::trace!("committed {} digests", updated);
        Ok(updated)
    }

    /// Hash values present on more than one record, ordered by hash.
    pub fn hashes_with_duplicates(&self) -> Result<Vec<String>, CatalogError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT hash FROM files WHERE hash IS NOT NULL \
             GROUP BY hash HAVING COUNT(*) > 1 ORDER BY hash",
        )?;
        let hashes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hashes)
    }

    /// All records with the given hash, newest modification time first.
    /// Ties on mtime are broken by ascending path, so the head of the list
    /// (the survivor) is stable across runs and discovery orders.
    pub fn records_for_hash(&self, hash: &str) -> Result<Vec<FileRecord>, CatalogError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, path, size, mtime_ns, hash FROM files \
             WHERE hash = ?1 ORDER BY mtime_ns DESC, path ASC",
        )?;
        let records = stmt
            .query_map(params![hash], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Look up a single record by its path key.
    pub fn record_for_path(&self, path: &str) -> Result<Option<FileRecord>, CatalogError> {
        match self.conn.query_row(
            "SELECT id, path, size, mtime_ns, hash FROM files WHERE path = ?1",
            params![path],
            row_to_record,
        ) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every record in the catalog, ordered by path.
    pub fn all_records(&self) -> Result<Vec<FileRecord>, CatalogError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, path, size, mtime_ns, hash FROM files ORDER BY path")?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Delete the given rows in one transaction. Returns how many existed.
    pub fn remove_records(&self, ids: &[i64]) -> Result<usize, CatalogError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.unchecked_transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare_cached("DELETE FROM files WHERE id = ?1")?;
            for id in ids {
                removed += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }

    /// Total number of records.
    pub fn file_count(&self) -> Result<u64, CatalogError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<FileRecord, rusqlite::Error> {
    Ok(FileRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        size: row.get::<_, i64>(2)? as u64,
        mtime_ns: row.get(3)?,
        hash: row.get(4)?,
    })
}

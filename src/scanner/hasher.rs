//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! Files are read in fixed-size chunks and fed into a BLAKE3 hasher, so
//! memory use stays flat no matter how large the file is. The digest is
//! rendered as lowercase hex for storage in the catalog's TEXT column.
//!
//! BLAKE3 here serves equality grouping, not tamper resistance; two files
//! with equal digests are treated as identical content.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::HashError;

/// Read chunk size for streaming hashes.
pub const HASH_CHUNK_SIZE: usize = 8192;

/// Hash a file's entire contents, returning the digest as lowercase hex.
///
/// # Errors
///
/// Returns [`HashError`] if the file cannot be opened or read. Callers in
/// the hash phase log the error and move on; the record keeps a NULL hash.
pub fn hash_file(path: &Path) -> Result<String, HashError> {
    let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf).map_err(|e| HashError::from_io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_hash_matches_direct_digest() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "f.txt", b"hello dupsweep");

        let expected = blake3::hash(b"hello dupsweep").to_hex().to_string();
        assert_eq!(hash_file(&path).unwrap(), expected);
    }

    #[test]
    fn test_hash_is_lowercase_hex_64() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "f.txt", b"x");

        let digest = hash_file(&path).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_identical_contents_hash_equal() {
        let tmp = TempDir::new().unwrap();
        let a = write_file(tmp.path(), "a.bin", b"same bytes");
        let b = write_file(tmp.path(), "b.bin", b"same bytes");
        let c = write_file(tmp.path(), "c.bin", b"other bytes");

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
        assert_ne!(hash_file(&a).unwrap(), hash_file(&c).unwrap());
    }

    #[test]
    fn test_hash_spans_multiple_chunks() {
        let tmp = TempDir::new().unwrap();
        let contents = vec![0xabu8; HASH_CHUNK_SIZE * 2 + 17];
        let path = write_file(tmp.path(), "big.bin", &contents);

        let expected = blake3::hash(&contents).to_hex().to_string();
        assert_eq!(hash_file(&path).unwrap(), expected);
    }

    #[test]
    fn test_empty_file_hashes() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "empty", b"");

        let expected = blake3::hash(b"").to_hex().to_string();
        assert_eq!(hash_file(&path).unwrap(), expected);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = hash_file(&tmp.path().join("gone")).unwrap_err();
        assert!(matches!(err, HashError::NotFound(_)));
    }
}

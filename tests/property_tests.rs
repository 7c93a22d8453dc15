use dupsweep::catalog::{Catalog, NewRecord};
use dupsweep::scanner::hash_file;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Deterministic Fisher-Yates driven by an LCG, so a failing case shrinks
/// to a reproducible insertion order.
fn shuffled_indices(n: usize, mut seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = (seed >> 33) as usize % (i + 1);
        order.swap(i, j);
    }
    order
}

proptest! {
    #[test]
    fn test_hash_determinism(content in "\\PC*") {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, content.as_bytes()).unwrap();

        let hash1 = hash_file(&path).unwrap();
        let hash2 = hash_file(&path).unwrap();

        prop_assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_matches_reference(content in prop::collection::vec(any::<u8>(), 0..20000)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, &content).unwrap();

        let streamed = hash_file(&path).unwrap();
        let reference = blake3::hash(&content).to_hex().to_string();

        prop_assert_eq!(streamed, reference);
    }

    #[test]
    fn test_survivor_is_independent_of_insertion_order(
        mtimes in prop::collection::vec(0i64..1_000_000, 2..12),
        seed in any::<u64>(),
    ) {
        let catalog = Catalog::open_in_memory().unwrap();

        // Insert the records in a shuffled order, one at a time, the way
        // they would trickle in from an arbitrary directory walk
        for &i in &shuffled_indices(mtimes.len(), seed) {
            catalog.insert_batch(&[NewRecord {
                path: format!("/fake/path/{:03}", i),
                size: 64,
                mtime_ns: mtimes[i],
            }]).unwrap();
        }

        // Stamp every record with the same content hash
        let digests: Vec<(i64, String)> = catalog
            .all_records()
            .unwrap()
            .iter()
            .map(|r| (r.id, "feedc0de".to_string()))
            .collect();
        catalog.set_hashes(&digests).unwrap();

        let records = catalog.records_for_hash("feedc0de").unwrap();

        // Newest mtime first; ties broken by the smaller path
        let mut expected: Vec<(i64, String)> = mtimes
            .iter()
            .enumerate()
            .map(|(i, &m)| (m, format!("/fake/path/{:03}", i)))
            .collect();
        expected.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let got: Vec<(i64, String)> = records
            .iter()
            .map(|r| (r.mtime_ns, r.path.clone()))
            .collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn test_size_classes_are_exactly_repeated_sizes(
        sizes in prop::collection::vec(0u64..32, 0..50),
    ) {
        let catalog = Catalog::open_in_memory().unwrap();

        let rows: Vec<NewRecord> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| NewRecord {
                path: format!("/fake/path/{:03}", i),
                size,
                mtime_ns: 0,
            })
            .collect();
        catalog.insert_batch(&rows).unwrap();

        let mut counts = std::collections::HashMap::new();
        for &size in &sizes {
            *counts.entry(size).or_insert(0u32) += 1;
        }
        let mut expected: Vec<u64> = counts
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(size, _)| size)
            .collect();
        expected.sort_unstable();

        prop_assert_eq!(catalog.sizes_with_duplicates().unwrap(), expected);
    }

    #[test]
    fn test_reinsertion_never_changes_a_record(
        size1 in 0u64..1000,
        size2 in 0u64..1000,
        mtime1 in 0i64..1_000_000_000,
        mtime2 in 0i64..1_000_000_000,
    ) {
        let catalog = Catalog::open_in_memory().unwrap();

        catalog.insert_batch(&[NewRecord {
            path: "/fake/stable".to_string(),
            size: size1,
            mtime_ns: mtime1,
        }]).unwrap();
        let inserted = catalog.insert_batch(&[NewRecord {
            path: "/fake/stable".to_string(),
            size: size2,
            mtime_ns: mtime2,
        }]).unwrap();

        prop_assert_eq!(inserted, 0);
        let record = catalog.record_for_path("/fake/stable").unwrap().unwrap();
        prop_assert_eq!(record.size, size1);
        prop_assert_eq!(record.mtime_ns, mtime1);
    }
}

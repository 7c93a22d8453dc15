//! dupsweep - Staged Duplicate File Cleaner
//!
//! A cross-platform Rust CLI application for removing duplicate files in three
//! explicit phases (scan, hash, clean) that share a persistent SQLite catalog,
//! so interrupted runs resume where they left off.

pub mod actions;
pub mod catalog;
pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::path::Path;

use anyhow::bail;
use bytesize::ByteSize;

use crate::actions::DisposalStrategy;
use crate::catalog::Catalog;
use crate::cli::{Cli, Mode};
use crate::duplicates::{hash_candidates, resolve_duplicates, HashConfig};
use crate::error::ExitCode;
use crate::progress::Progress;
use crate::scanner::Scanner;
use crate::signal::CancelToken;

/// Top-level application entry point.
///
/// Opens the catalog and dispatches to the phase selected on the command
/// line. The scan and hash phases install a Ctrl+C handler and stop
/// cooperatively; a cancelled run still exits successfully because its
/// progress is committed to the catalog.
///
/// # Errors
///
/// Returns an error for unusable input (missing ROOT, unreadable root
/// directory) and for catalog failures. Per-file problems never abort a
/// phase; they are logged and counted instead.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let catalog = Catalog::open(&cli.catalog)?;
    let progress = Progress::new(cli.quiet);

    match cli.mode() {
        Mode::Scan => {
            let Some(root) = cli.root.as_deref() else {
                bail!("scan mode requires a ROOT directory; see --help");
            };
            let cancel = signal::install_handler();
            run_scan(&catalog, root, &cancel, progress)
        }
        Mode::Hash => {
            let cancel = signal::install_handler();
            run_hash(&catalog, &cancel, progress)
        }
        Mode::Clean => run_clean(&catalog, disposal_strategy(&cli)),
        Mode::Purge => run_purge(&catalog),
    }
}

/// Map the clean-mode flags onto a disposal strategy. The parser already
/// rejects `--dry-run` together with `--trash-dir`.
fn disposal_strategy(cli: &Cli) -> DisposalStrategy {
    if cli.dry_run {
        DisposalStrategy::DryRun
    } else if let Some(dir) = &cli.trash_dir {
        DisposalStrategy::Quarantine(dir.clone())
    } else {
        DisposalStrategy::Delete
    }
}

/// Phase 1: walk the root and record file metadata into the catalog.
fn run_scan(
    catalog: &Catalog,
    root: &Path,
    cancel: &CancelToken,
    progress: Progress,
) -> anyhow::Result<ExitCode> {
    let spinner = progress.scan_spinner();
    let scanner = Scanner::new(root)
        .with_cancel_flag(cancel.flag())
        .with_progress(spinner.clone());

    let stats = scanner.scan(catalog)?;
    spinner.finish_and_clear();

    log::info!(
        "scan finished: {} seen, {} new, {} skipped, interrupted: {}",
        stats.seen,
        stats.inserted,
        stats.skipped,
        stats.interrupted
    );

    if stats.interrupted {
        println!("Scan interrupted; progress saved.");
    } else {
        println!(
            "Scan complete. {} files recorded ({} new).",
            stats.seen, stats.inserted
        );
    }

    let classes = catalog.sizes_with_duplicates()?;
    println!("{} size classes with potential duplicates.", classes.len());
    println!("Run again with --hash to compute content hashes.");

    Ok(ExitCode::Success)
}

/// Phase 2: hash every unhashed file whose size occurs more than once.
fn run_hash(
    catalog: &Catalog,
    cancel: &CancelToken,
    progress: Progress,
) -> anyhow::Result<ExitCode> {
    let sizes = catalog.sizes_with_duplicates()?;
    println!("Hashing {} candidate size classes...", sizes.len());

    let bar = progress.hash_bar(sizes.len() as u64);
    let config = HashConfig::default()
        .with_cancel_flag(cancel.flag())
        .with_progress(bar.clone());

    let stats = hash_candidates(catalog, &sizes, &config)?;
    bar.finish_and_clear();

    log::info!(
        "hash phase finished: {}/{} classes, {} hashed, {} skipped, interrupted: {}",
        stats.classes_completed,
        stats.candidate_classes,
        stats.hashed,
        stats.skipped,
        stats.interrupted
    );

    if stats.interrupted {
        println!("Hashing interrupted; progress saved.");
    } else {
        println!(
            "Hashing complete. {} files hashed ({} skipped).",
            stats.hashed, stats.skipped
        );
    }
    println!("Run with --clean to resolve duplicates.");

    Ok(ExitCode::Success)
}

/// Phase 3: keep the newest copy of each duplicate group, dispose the rest.
fn run_clean(catalog: &Catalog, strategy: DisposalStrategy) -> anyhow::Result<ExitCode> {
    log::info!("resolving duplicates with strategy {:?}", strategy);

    let stats = resolve_duplicates(catalog, &strategy)?;

    println!(
        "{} duplicates processed ({} failed), {} reclaimed.",
        stats.processed,
        stats.failed,
        ByteSize::b(stats.bytes_reclaimed)
    );

    Ok(ExitCode::Success)
}

/// Housekeeping: drop catalog rows whose paths no longer exist on disk.
fn run_purge(catalog: &Catalog) -> anyhow::Result<ExitCode> {
    let records = catalog.all_records()?;
    let stale: Vec<i64> = records
        .iter()
        .filter(|record| !Path::new(&record.path).exists())
        .map(|record| record.id)
        .collect();

    let purged = catalog.remove_records(&stale)?;
    log::info!("purged {} of {} catalog records", purged, records.len());

    println!("Purged {} stale records from the catalog.", purged);

    Ok(ExitCode::Success)
}

//! Command-line interface definitions for dupsweep.
//!
//! The pipeline runs one phase per invocation, selected by mutually
//! exclusive mode flags; everything is flag-driven, there are no
//! subcommands and no config file.
//!
//! # Example
//!
//! ```bash
//! # Phase 1: record files under a root into the catalog
//! dupsweep ~/Downloads
//!
//! # Phase 2: hash candidate size classes
//! dupsweep --hash
//!
//! # Phase 3: preview, quarantine, or delete duplicates
//! dupsweep --clean --dry-run
//! dupsweep --clean --trash-dir ~/dup-quarantine
//! dupsweep --clean
//!
//! # Housekeeping: drop records whose files are gone
//! dupsweep --purge
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::catalog::DEFAULT_CATALOG_NAME;

/// Staged duplicate file cleaner with a resumable SQLite catalog.
///
/// dupsweep works in three explicit phases, each a separate invocation:
/// scan records file metadata, --hash computes content hashes for files
/// whose size occurs more than once, and --clean keeps the newest copy of
/// each duplicate group and disposes of the rest. All state lives in the
/// catalog database, so an interrupted phase resumes where it left off.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (required for the default scan mode)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Hash candidate size classes recorded by a previous scan
    #[arg(long, conflicts_with_all = ["clean", "purge"])]
    pub hash: bool,

    /// Resolve duplicate groups: keep the newest copy, dispose the rest
    #[arg(long, conflicts_with = "purge")]
    pub clean: bool,

    /// With --clean: report what would be removed without touching files
    #[arg(
        long,
        requires = "clean",
        conflicts_with_all = ["trash_dir", "hash", "purge"]
    )]
    pub dry_run: bool,

    /// With --clean: move duplicates into DIR instead of deleting them
    #[arg(
        long,
        value_name = "DIR",
        requires = "clean",
        conflicts_with_all = ["hash", "purge"]
    )]
    pub trash_dir: Option<PathBuf>,

    /// Remove catalog records whose files no longer exist on disk
    #[arg(long)]
    pub purge: bool,

    /// Path to the catalog database
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CATALOG_NAME)]
    pub catalog: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Which phase a parsed command line selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Default: walk ROOT and record files into the catalog.
    Scan,
    /// Hash unhashed records in candidate size classes.
    Hash,
    /// Resolve duplicate groups and dispose of non-survivors.
    Clean,
    /// Drop catalog rows whose paths are gone.
    Purge,
}

impl Cli {
    /// The phase selected by the mode flags. The flags are declared
    /// mutually exclusive, so at most one of them is set.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.purge {
            Mode::Purge
        } else if self.hash {
            Mode::Hash
        } else if self.clean {
            Mode::Clean
        } else {
            Mode::Scan
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_scan() {
        let cli = Cli::try_parse_from(["dupsweep", "/some/path"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/some/path")));
        assert_eq!(cli.mode(), Mode::Scan);
        assert_eq!(cli.catalog, PathBuf::from(DEFAULT_CATALOG_NAME));
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_scan_without_root_is_parse_ok() {
        // Missing ROOT is a runtime error for scan mode, not a parse error,
        // because --hash/--clean/--purge legitimately run without it
        let cli = Cli::try_parse_from(["dupsweep"]).unwrap();
        assert_eq!(cli.root, None);
        assert_eq!(cli.mode(), Mode::Scan);
    }

    #[test]
    fn test_parse_hash_mode() {
        let cli = Cli::try_parse_from(["dupsweep", "--hash"]).unwrap();
        assert_eq!(cli.mode(), Mode::Hash);
    }

    #[test]
    fn test_parse_hash_mode_ignores_root() {
        let cli = Cli::try_parse_from(["dupsweep", "/ignored", "--hash"]).unwrap();
        assert_eq!(cli.mode(), Mode::Hash);
        assert_eq!(cli.root, Some(PathBuf::from("/ignored")));
    }

    #[test]
    fn test_parse_clean_modes() {
        let cli = Cli::try_parse_from(["dupsweep", "--clean"]).unwrap();
        assert_eq!(cli.mode(), Mode::Clean);
        assert!(!cli.dry_run);
        assert_eq!(cli.trash_dir, None);

        let cli = Cli::try_parse_from(["dupsweep", "--clean", "--dry-run"]).unwrap();
        assert!(cli.dry_run);

        let cli =
            Cli::try_parse_from(["dupsweep", "--clean", "--trash-dir", "/tmp/quarantine"]).unwrap();
        assert_eq!(cli.trash_dir, Some(PathBuf::from("/tmp/quarantine")));
    }

    #[test]
    fn test_parse_purge_mode() {
        let cli = Cli::try_parse_from(["dupsweep", "--purge"]).unwrap();
        assert_eq!(cli.mode(), Mode::Purge);
    }

    #[test]
    fn test_mode_flags_are_mutually_exclusive() {
        assert!(Cli::try_parse_from(["dupsweep", "--hash", "--clean"]).is_err());
        assert!(Cli::try_parse_from(["dupsweep", "--hash", "--purge"]).is_err());
        assert!(Cli::try_parse_from(["dupsweep", "--clean", "--purge"]).is_err());
    }

    #[test]
    fn test_dry_run_conflicts_with_trash_dir() {
        let result = Cli::try_parse_from([
            "dupsweep",
            "--clean",
            "--dry-run",
            "--trash-dir",
            "/tmp/quarantine",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_clean_modifiers_require_clean() {
        assert!(Cli::try_parse_from(["dupsweep", "--dry-run"]).is_err());
        assert!(Cli::try_parse_from(["dupsweep", "--trash-dir", "/tmp/q"]).is_err());
        assert!(Cli::try_parse_from(["dupsweep", "--hash", "--dry-run"]).is_err());
    }

    #[test]
    fn test_catalog_override() {
        let cli =
            Cli::try_parse_from(["dupsweep", "/path", "--catalog", "/tmp/other.db"]).unwrap();
        assert_eq!(cli.catalog, PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["dupsweep", "-v", "-q", "/path"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["dupsweep", "-vv", "/path"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_json_errors_flag() {
        let cli = Cli::try_parse_from(["dupsweep", "--json-errors", "--hash"]).unwrap();
        assert!(cli.json_errors);
    }

    #[test]
    fn test_help_and_version_exit_early() {
        assert!(Cli::try_parse_from(["dupsweep", "--help"]).is_err());
        assert!(Cli::try_parse_from(["dupsweep", "--version"]).is_err());
    }
}

//! File actions module.
//!
//! This module implements the disposal side of duplicate resolution:
//! - Dry-run reporting (no filesystem changes)
//! - Quarantine (move into a user-chosen directory, keeping the base name)
//! - Permanent deletion
//!
//! Exactly one strategy applies per run; the resolver calls [`dispose`] for
//! each non-surviving record and isolates failures per target.
//!
//! ```no_run
//! use dupsweep::actions::{dispose, DisposalStrategy};
//! use std::path::Path;
//!
//! let strategy = DisposalStrategy::Delete;
//! match dispose(Path::new("/path/to/duplicate.txt"), &strategy) {
//!     Ok(outcome) => println!("{outcome:?}"),
//!     Err(e) => eprintln!("Failed: {e}"),
//! }
//! ```

pub mod dispose;

// Re-export commonly used types
pub use dispose::{dispose, DisposalStrategy, DisposeError, Disposition};

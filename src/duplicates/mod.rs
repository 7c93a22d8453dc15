//! Duplicate detection and resolution.
//!
//! This module provides the two catalog-driven phases that follow a scan:
//! - [`hashing`]: compute content hashes for candidate size classes
//! - [`resolver`]: group hashed records, pick survivors, dispose the rest

pub mod hashing;
pub mod resolver;

pub use hashing::{hash_candidates, HashConfig, HashPhaseStats};
pub use resolver::{resolve_duplicates, ResolveStats};

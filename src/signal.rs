//! Cooperative cancellation for the pipeline phases.
//!
//! A [`CancelToken`] wraps an `AtomicBool` flag that is set exactly once when
//! Ctrl+C is received. Phases poll the token at file boundaries and wind down
//! normally, so a cancelled run still commits whatever batch it was working
//! on. There is deliberately no way to clear the flag again.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupsweep::signal::install_handler;
//!
//! let cancel = install_handler();
//!
//! // Inside a processing loop:
//! if cancel.is_cancelled() {
//!     // flush pending work and return normally
//! }
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag polled by the scanner and hasher.
///
/// The token is `Send` and `Sync`; clones share the same underlying flag.
/// Once [`cancel`](CancelToken::cancel) has been called the token stays
/// cancelled for the rest of the process.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token with the flag initially unset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation. Idempotent; the flag is never cleared.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the underlying flag for handing to the signal closure.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a Ctrl+C handler that sets the cancellation flag.
///
/// Call this once, before the first phase starts. When Ctrl+C is pressed the
/// flag is set, a short note is printed to stderr, and the running phase is
/// expected to flush and return normally; cancellation is not an error and
/// the process still exits with the normal success code.
///
/// A process may only register one Ctrl+C handler. If registration fails
/// (another handler is already installed, as happens when tests call this
/// repeatedly) the returned token is simply not hooked to any signal;
/// [`CancelToken::cancel`] still works for manual cancellation.
pub fn install_handler() -> CancelToken {
    let token = CancelToken::new();
    let flag = token.flag();

    if let Err(err) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);

        // stderr is line-buffered, flush so the note lands before rundown
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing the current batch...");
        let _ = std::io::stderr().flush();

        log::info!("cancellation signal received");
    }) {
        log::debug!("Ctrl+C handler already registered ({err}); token is manual-only");
    }

    token
}

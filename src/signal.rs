//! Ctrl+C handling.
//!
//! An interrupt only raises a shared flag. The walker and the hashing pool
//! poll it and wind down; the pipeline then reports
//! [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted)
//! and the process exits with code 130. `run_app` checks the flag once more
//! before a prune starts; a prune already under way runs to completion.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// A handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a shutdown was requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request a shutdown without a signal.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag to hand to [`FinderConfig`](crate::duplicates::FinderConfig)
    /// and other long-running work.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error installing the signal hook.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// `ctrlc` refused the handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Hook Ctrl+C to the process-wide handler and return it with its flag cleared.
///
/// The hook is installed once per process. Repeated calls reuse it, which
/// lets the app run several times in one test binary.
///
/// # Errors
///
/// Returns an error if the hook cannot be installed on the first call.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = GLOBAL_HANDLER.get_or_init(ShutdownHandler::new).clone();
    let flag = handler.get_flag();
    let hooked = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\nInterrupted, stopping...");
        let _ = stderr.flush();
    });

    match hooked {
        Ok(()) => Ok(handler),
        // Someone else owns SIGINT; the flag still works for manual requests
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C already hooked elsewhere");
            Ok(handler)
        }
        Err(err) => Err(SignalError::from(err)),
    }
}

/// A handler with no signal hook, for tests and embedding.
#[must_use]
pub fn create_handler() -> ShutdownHandler {
    ShutdownHandler::new()
}

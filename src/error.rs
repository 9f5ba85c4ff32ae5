//! Error types for terminal setup and teardown.
//!
//! Only the terminal driver produces errors. Input decoding, the task channel
//! and the component tree encode failure as "no event", `false` or `None`.

use std::io;
use thiserror::Error;

/// Failures raised while switching the controlling terminal in or out of
/// interactive mode.
///
/// The screen loop never aborts on these: it logs them and keeps running with
/// whatever capability is left.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// The line discipline could not be read or changed (no controlling terminal).
    #[error("failed to change terminal mode: {0}")]
    RawMode(#[source] io::Error),

    /// An OS signal handler could not be installed.
    #[error("failed to install handler for {signal}: {source}")]
    Signal {
        /// Signal name, e.g. `SIGWINCH`.
        signal: &'static str,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A listener thread could not be spawned.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread name.
        name: &'static str,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Writing escape sequences to the output stream failed.
    #[error("failed to write to terminal: {0}")]
    Write(#[from] io::Error),
}

/// Result alias for terminal driver operations.
pub type Result<T> = std::result::Result<T, TerminalError>;

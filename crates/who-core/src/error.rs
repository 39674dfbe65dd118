//! Core error type.
//!
//! Returned by config loading and by `SessionSampler` implementations.

use std::process::ExitStatus;

use thiserror::Error;

/// Core layer error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid or unreadable configuration
    #[error("config error: {0}")]
    Config(String),

    /// The session-listing command could not be started or its output read
    #[error("failed to run '{command}': {source}")]
    CommandSpawn {
        /// Program name that was invoked
        command: String,
        /// Underlying I/O error (not found, permission denied, ...)
        #[source]
        source: std::io::Error,
    },

    /// The session-listing command ran but exited unsuccessfully
    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        /// Program name that was invoked
        command: String,
        /// Exit status reported by the OS
        status: ExitStatus,
        /// Trimmed standard error of the command
        stderr: String,
    },
}

//! Error types for orchestration runs.
//!
//! Failures local to a procedure are absorbed into its own state wherever
//! retry semantics apply. Only the conditions below escape a driver, and each
//! one maps to the exit code the whole run should finish with.

use thiserror::Error;

/// Errors that end an orchestration run.
#[derive(Debug, Error)]
pub enum Error {
    /// The ordered driver's deadline elapsed before every procedure finished.
    #[error("Timed out: {description}")]
    Timeout {
        /// Description of the first procedure that had not completed
        description: String,
    },

    /// At least one remote command exited with a nonzero code.
    #[error("remote command failed with exit code {code}")]
    RemoteFailed {
        /// First nonzero exit code observed, in completion order
        code: i32,
    },

    /// A step of the artifact deployment pipeline failed.
    #[error("{step} failed at {host} (exit code {code})")]
    StepFailed {
        /// Host the pipeline was deploying to
        host: String,
        /// Name of the failed step
        step: String,
        /// Exit code of the step's remote command
        code: i32,
    },

    /// The local transport process could not be started.
    #[error("failed to launch remote command on {host}: {source}")]
    Launch {
        /// Target host
        host: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Exit code the process should terminate with for this error.
    ///
    /// Remote failures surface the remote code itself; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::RemoteFailed { code } => *code,
            _ => 1,
        }
    }
}

/// Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for proc-pipe.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for proc-pipe operations.
///
/// The three execution failures (`Startup`, `Timeout`, `ExitCode`) are the
/// only outcomes `execute` produces besides success; callers match on the
/// variant to decide whether to retry, surface, or treat as fatal.
#[derive(Error, Debug)]
pub enum ProcPipeError {
    /// The OS refused or was unable to create the process.
    #[error("failed to start `{command}`: {source}")]
    Startup {
        /// Display form of the command line.
        command: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The process did not terminate within the configured timeout and was
    /// forcibly killed.
    #[error("`{command}` timed out after {elapsed:?}")]
    Timeout {
        /// Display form of the command line.
        command: String,
        /// Wall-clock time from spawn to kill.
        elapsed: Duration,
        /// Standard output captured before the kill. May be partial; empty
        /// when an external output sink was configured.
        stdout: Vec<u8>,
        /// Standard error captured before the kill. May be partial.
        stderr: Vec<u8>,
    },

    /// The process terminated normally but its exit code is not in the
    /// accepted set.
    #[error("`{command}` exited with code {code}")]
    ExitCode {
        /// Display form of the command line.
        command: String,
        /// The actual exit code.
        code: i32,
        /// Wall-clock time from spawn to exit.
        elapsed: Duration,
        /// Captured standard output. Empty when an external sink was used.
        stdout: Vec<u8>,
        /// Captured standard error.
        stderr: Vec<u8>,
    },

    /// A configured working directory does not exist or is not a directory.
    #[error("working directory `{}` does not exist or is not a directory", .0.display())]
    WorkingDirectory(PathBuf),

    /// I/O error while pumping streams or waiting on the child.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience Result type for proc-pipe operations.
pub type Result<T> = std::result::Result<T, ProcPipeError>;

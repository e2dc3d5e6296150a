//! # proc-pipe
//!
//! Bounded, deadlock-free execution of external processes: spawn a command,
//! feed it input, capture its output, enforce a wall-clock timeout, and
//! validate its exit status — one synchronous call returning a structured
//! result or a typed failure.
//!
//! Each of the child's standard streams is pumped on its own thread
//! concurrently with the wait for exit, so a child that produces more than
//! an OS pipe buffer on stdout and stderr while consuming a large stdin
//! never stalls. On timeout the child is killed and reaped before the
//! failure is surfaced; no invocation leaves an orphaned process behind.
//!
//! ## Quick start
//!
//! ```no_run
//! use proc_pipe::{filter, ProcBuilder, ProcPipeError};
//! use std::time::Duration;
//!
//! fn main() -> proc_pipe::Result<()> {
//!     // Fluent form
//!     let result = ProcBuilder::new("git")
//!         .args(["rev-parse", "HEAD"])
//!         .timeout(Duration::from_secs(2))
//!         .run()?;
//!     println!("HEAD is {}", result.output_string().unwrap_or_default());
//!
//!     // One-liners
//!     let version = proc_pipe::run("rustc", &["--version"])?;
//!     let lowered = filter("HELLO", "tr", &["A-Z", "a-z"])?;
//!     assert_eq!(lowered, "hello");
//!
//!     // Failures are variants, not message strings
//!     match ProcBuilder::new("false").run() {
//!         Err(ProcPipeError::ExitCode { code, .. }) => eprintln!("exited {code}"),
//!         other => drop(other),
//!     }
//!     let _ = version;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod execution;
pub mod logging;

// Re-export commonly used types
pub use error::{ProcPipeError, Result};
pub use execution::{execute, filter, run, CommandSpec, ProcBuilder, ProcResult, DEFAULT_TIMEOUT};

//! Bounded execution of external processes.
//!
//! This module provides:
//! - A fluent [`ProcBuilder`] producing immutable [`CommandSpec`]s
//! - The [`execute`] engine: concurrent stream pumping, a wall-clock
//!   timeout, exit-code validation
//! - One-line helpers [`run`] and [`filter`]
//!
//! # Example
//!
//! ```no_run
//! use proc_pipe::ProcBuilder;
//! use std::time::Duration;
//!
//! let result = ProcBuilder::new("echo")
//!     .arg("hello")
//!     .timeout(Duration::from_secs(2))
//!     .run()
//!     .unwrap();
//! assert_eq!(result.output_string().as_deref(), Some("hello\n"));
//! ```

mod command;
mod executor;
mod pump;
mod result;

pub use command::{CommandSpec, ProcBuilder};
pub use executor::{execute, filter, run, DEFAULT_TIMEOUT};
pub use result::ProcResult;

//! Command specification and the fluent configuration builder.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ProcPipeError, Result};
use crate::execution::executor::{self, DEFAULT_TIMEOUT};
use crate::execution::result::ProcResult;

/// Where the child's standard input comes from.
pub(crate) enum InputSource {
    /// A fixed byte buffer.
    Bytes(Vec<u8>),
    /// A caller-supplied stream, read to end.
    Stream(Box<dyn Read + Send>),
}

/// Where the child's standard output goes.
pub(crate) enum OutputTarget {
    /// The default in-memory buffer, exposed on the result.
    Capture,
    /// A caller-owned sink. The engine writes to it but never closes it.
    Stream(Box<dyn Write + Send>),
}

/// Immutable snapshot of everything one execution needs.
///
/// Built by [`ProcBuilder`]; consumed by exactly one call to
/// [`execute`](crate::execute).
pub struct CommandSpec {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    pub(crate) env: HashMap<String, String>,
    pub(crate) working_dir: Option<PathBuf>,
    pub(crate) stdin: Option<InputSource>,
    pub(crate) stdout: OutputTarget,
    pub(crate) timeout: Duration,
    pub(crate) accepted_exit_codes: HashSet<i32>,
}

impl CommandSpec {
    /// The command line in display form: program followed by its arguments,
    /// space-separated. For humans and error messages only; the argument
    /// vector itself is passed to the OS verbatim, never re-parsed.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Whether `code` satisfies the accepted-exit-code set. An empty set
    /// accepts any exit code.
    pub(crate) fn accepts(&self, code: i32) -> bool {
        self.accepted_exit_codes.is_empty() || self.accepted_exit_codes.contains(&code)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env)
            .field("working_dir", &self.working_dir)
            .field(
                "stdin",
                &match &self.stdin {
                    Some(InputSource::Bytes(bytes)) => format!("{} bytes", bytes.len()),
                    Some(InputSource::Stream(_)) => "stream".to_string(),
                    None => "closed".to_string(),
                },
            )
            .field(
                "stdout",
                &match &self.stdout {
                    OutputTarget::Capture => "capture",
                    OutputTarget::Stream(_) => "stream",
                },
            )
            .field("timeout", &self.timeout)
            .field("accepted_exit_codes", &self.accepted_exit_codes)
            .finish()
    }
}

/// Fluent builder for external process invocations.
///
/// A builder can be reused: each [`run`](Self::run) (or
/// [`build`](Self::build)) takes the captured input/output state with it, so
/// the next invocation starts from clean streams while keeping the command,
/// environment, timeout, and accepted exit codes.
pub struct ProcBuilder {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    working_dir: Option<PathBuf>,
    stdin: Option<InputSource>,
    stdout: Option<Box<dyn Write + Send>>,
    timeout: Duration,
    accepted_exit_codes: HashSet<i32>,
}

impl fmt::Debug for ProcBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcBuilder")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env)
            .field("working_dir", &self.working_dir)
            .field(
                "stdin",
                &match &self.stdin {
                    Some(InputSource::Bytes(bytes)) => format!("{} bytes", bytes.len()),
                    Some(InputSource::Stream(_)) => "stream".to_string(),
                    None => "closed".to_string(),
                },
            )
            .field(
                "stdout",
                &match &self.stdout {
                    Some(_) => "stream",
                    None => "capture",
                },
            )
            .field("timeout", &self.timeout)
            .field("accepted_exit_codes", &self.accepted_exit_codes)
            .finish()
    }
}

impl ProcBuilder {
    /// Create a builder for `program`.
    ///
    /// Defaults: 5 second timeout, exit code 0 accepted, no input, output
    /// captured in memory.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            working_dir: None,
            stdin: None,
            stdout: None,
            timeout: DEFAULT_TIMEOUT,
            accepted_exit_codes: HashSet::from([0]),
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment variable, overlaid on the inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add multiple environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.env.insert(key.into(), value.into());
        }
        self
    }

    /// Set the working directory for the child.
    ///
    /// The path must exist and be a directory; that is validated here, at
    /// configuration time, not at spawn time. Unset means the caller's
    /// current directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(ProcPipeError::WorkingDirectory(dir));
        }
        self.working_dir = Some(dir);
        Ok(self)
    }

    /// Supply the child's standard input as bytes (or anything convertible,
    /// e.g. a `&str`).
    pub fn input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(InputSource::Bytes(input.into()));
        self
    }

    /// Take the child's standard input from a stream, read to end.
    pub fn input_stream(mut self, stdin: impl Read + Send + 'static) -> Self {
        self.stdin = Some(InputSource::Stream(Box::new(stdin)));
        self
    }

    /// Redirect the child's standard output to a caller-owned sink instead
    /// of the in-memory capture. The result's output accessors then report
    /// not-available.
    pub fn output_stream(mut self, stdout: impl Write + Send + 'static) -> Self {
        self.stdout = Some(Box::new(stdout));
        self
    }

    /// Set the execution timeout. The default is [`DEFAULT_TIMEOUT`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the accepted exit codes with a single code.
    pub fn expect_exit_code(self, code: i32) -> Self {
        self.expect_exit_codes([code])
    }

    /// Replace the set of accepted exit codes.
    pub fn expect_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.accepted_exit_codes = codes.into_iter().collect();
        self
    }

    /// Accept any exit code.
    pub fn ignore_exit_status(mut self) -> Self {
        self.accepted_exit_codes.clear();
        self
    }

    /// Freeze the current configuration into an immutable [`CommandSpec`].
    ///
    /// The input source and output sink move into the spec and the
    /// builder's stream state resets, so no captured stream leaks into a
    /// later invocation.
    pub fn build(&mut self) -> CommandSpec {
        CommandSpec {
            program: self.program.clone(),
            args: self.args.clone(),
            env: self.env.clone(),
            working_dir: self.working_dir.clone(),
            stdin: self.stdin.take(),
            stdout: match self.stdout.take() {
                Some(sink) => OutputTarget::Stream(sink),
                None => OutputTarget::Capture,
            },
            timeout: self.timeout,
            accepted_exit_codes: self.accepted_exit_codes.clone(),
        }
    }

    /// Build and execute, blocking until the process terminates, times out,
    /// or fails to start.
    pub fn run(&mut self) -> Result<ProcResult> {
        executor::execute(self.build())
    }
}

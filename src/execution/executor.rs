//! The execution engine: spawn, pump, race the clock, classify the outcome.

use std::io::{self, Cursor, Read, Write};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use super::command::{CommandSpec, InputSource, OutputTarget, ProcBuilder};
use super::pump::{CaptureBuffer, StreamPump};
use super::result::ProcResult;
use crate::error::{ProcPipeError, Result};

/// Default execution timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long forced cleanup waits for a pump before detaching it.
const PUMP_GRACE: Duration = Duration::from_millis(250);

/// Reported when the child was terminated by a signal and therefore has no
/// exit code. Never a real Unix exit code.
const SIGNAL_EXIT_CODE: i32 = -1;

/// Kills and reaps the child on drop unless execution already did.
///
/// Every early return between spawn and classification runs through this
/// guard, so no exit path leaves an orphaned process or an open pipe.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Execute one fully-resolved command specification.
///
/// Blocks until the process exits, the timeout fires, or the spawn fails.
/// Exactly one spawn attempt is made; retries, if wanted, belong to the
/// caller. See [`ProcPipeError`] for the three failure kinds — each carries
/// enough structure for callers to react programmatically.
///
/// On timeout the child is killed outright (no signal escalation) and the
/// output captured up to that point, possibly mid-write, rides along on the
/// error.
pub fn execute(mut spec: CommandSpec) -> Result<ProcResult> {
    let command_line = spec.command_line();

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .envs(&spec.env)
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            // Closed up front so the child never blocks waiting for input
            // that will not come.
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &spec.working_dir {
        command.current_dir(dir);
    }

    debug!(command = %command_line, timeout = ?spec.timeout, "spawning");
    let start = Instant::now();
    let child = match command.spawn() {
        Ok(child) => child,
        Err(source) => {
            return Err(ProcPipeError::Startup {
                command: command_line,
                source,
            })
        }
    };
    let mut guard = ChildGuard::new(child);

    // Wire all three streams before waiting; an unattached pipe is a
    // deadlock hazard once its buffer fills.
    let stdin_pump = match spec.stdin.take() {
        Some(source) => {
            let pipe = guard
                .child
                .stdin
                .take()
                .ok_or_else(|| io::Error::other("child stdin was not piped"))?;
            let reader: Box<dyn Read + Send> = match source {
                InputSource::Bytes(bytes) => Box::new(Cursor::new(bytes)),
                InputSource::Stream(stream) => stream,
            };
            Some(StreamPump::spawn("stdin", reader, pipe)?)
        }
        None => None,
    };

    let (stdout_sink, stdout_capture): (Box<dyn Write + Send>, Option<CaptureBuffer>) =
        match std::mem::replace(&mut spec.stdout, OutputTarget::Capture) {
            OutputTarget::Capture => {
                let buffer = CaptureBuffer::new();
                (Box::new(buffer.clone()), Some(buffer))
            }
            OutputTarget::Stream(sink) => (sink, None),
        };
    let stdout_pipe = guard
        .child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not piped"))?;
    let stdout_pump = StreamPump::spawn("stdout", stdout_pipe, stdout_sink)?;

    // Stderr is always captured, for diagnostics on the failure paths.
    let stderr_capture = CaptureBuffer::new();
    let stderr_pipe = guard
        .child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("child stderr was not piped"))?;
    let stderr_pump = StreamPump::spawn("stderr", stderr_pipe, stderr_capture.clone())?;

    let deadline = start + spec.timeout;
    let budget = deadline.saturating_duration_since(Instant::now());
    match guard.child.wait_timeout(budget).map_err(ProcPipeError::Io)? {
        Some(status) => {
            guard.reaped = true;

            // Natural exit. Drain the pumps fully before assembling the
            // result; bytes in flight must never be truncated.
            if let Some(pump) = stdin_pump {
                match pump.join() {
                    // The child exited without consuming all its input.
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        debug!(command = %command_line, "child closed stdin early");
                    }
                    Err(e) => return Err(ProcPipeError::Io(e)),
                    Ok(_) => {}
                }
            }
            stdout_pump.join().map_err(ProcPipeError::Io)?;
            stderr_pump.join().map_err(ProcPipeError::Io)?;

            let elapsed = start.elapsed();
            let exit_code = status.code().unwrap_or(SIGNAL_EXIT_CODE);
            debug!(command = %command_line, exit_code, ?elapsed, "process exited");

            if spec.accepts(exit_code) {
                Ok(ProcResult::new(
                    command_line,
                    stdout_capture.map(|buffer| buffer.snapshot()),
                    exit_code,
                    elapsed,
                ))
            } else {
                Err(ProcPipeError::ExitCode {
                    command: command_line,
                    code: exit_code,
                    elapsed,
                    stdout: stdout_capture
                        .map(|buffer| buffer.snapshot())
                        .unwrap_or_default(),
                    stderr: stderr_capture.snapshot(),
                })
            }
        }
        None => {
            // The deadline elapsed first. Kill without escalation
            // (intentional scope boundary), reap, then give the pumps a
            // bounded chance to finish — killing the child closed its ends
            // of the pipes.
            warn!(command = %command_line, timeout = ?spec.timeout, "timed out, killing");
            let _ = guard.child.kill();
            let _ = guard.child.wait();
            guard.reaped = true;

            if let Some(pump) = stdin_pump {
                let _ = pump.join_within(PUMP_GRACE);
            }
            let _ = stdout_pump.join_within(PUMP_GRACE);
            let _ = stderr_pump.join_within(PUMP_GRACE);

            Err(ProcPipeError::Timeout {
                command: command_line,
                elapsed: start.elapsed(),
                stdout: stdout_capture
                    .map(|buffer| buffer.snapshot())
                    .unwrap_or_default(),
                stderr: stderr_capture.snapshot(),
            })
        }
    }
}

/// Run a command and return its captured standard output as text.
///
/// One-line composition of [`ProcBuilder`] and the engine for the common
/// "just give me the output" case. Defaults apply: 5 second timeout, exit
/// code 0 expected.
pub fn run(command: &str, args: &[&str]) -> Result<String> {
    let result = ProcBuilder::new(command).args(args.iter().copied()).run()?;
    Ok(result.output_string().unwrap_or_default())
}

/// Feed `input` through a command and return its captured standard output
/// as text.
pub fn filter(input: &str, command: &str, args: &[&str]) -> Result<String> {
    let result = ProcBuilder::new(command)
        .args(args.iter().copied())
        .input(input)
        .run()?;
    Ok(result.output_string().unwrap_or_default())
}

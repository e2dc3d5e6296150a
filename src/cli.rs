//! Command-line interface for the proc-pipe binary.
//!
//! Uses lexopt for minimal binary size overhead. Everything after the first
//! positional argument is passed to the child verbatim, so `proc-pipe --
//! grep -c foo` needs no quoting.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Program to execute.
    pub command: Option<String>,
    /// Arguments handed to the program verbatim.
    pub args: Vec<String>,
    /// Timeout in milliseconds.
    pub timeout_millis: Option<u64>,
    /// Working directory for the child.
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables (KEY=VALUE pairs).
    pub env: Vec<(String, String)>,
    /// Text fed to the child's standard input.
    pub input: Option<String>,
    /// Accepted exit codes; replaces the default {0} when non-empty.
    pub accept: Vec<i32>,
    /// Accept any exit code.
    pub ignore_exit_status: bool,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('t') | Long("timeout") => {
                let value: String = parser.value()?.parse()?;
                result.timeout_millis = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("timeout", value))?,
                );
            }
            Short('C') | Long("cwd") => {
                result.working_dir = Some(parser.value()?.parse()?);
            }
            Short('e') | Long("env") => {
                let pair: String = parser.value()?.parse()?;
                match pair.split_once('=') {
                    Some((key, value)) => result.env.push((key.to_string(), value.to_string())),
                    None => return Err(ArgsError::InvalidValue("env", pair)),
                }
            }
            Short('i') | Long("input") => {
                result.input = Some(parser.value()?.parse()?);
            }
            Long("accept") => {
                let value: String = parser.value()?.parse()?;
                let code = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("accept", value))?;
                result.accept.push(code);
            }
            Long("ignore-exit-status") => {
                result.ignore_exit_status = true;
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                result.command = Some(val.string()?);
                for rest in parser.raw_args()? {
                    result.args.push(rest.to_string_lossy().into_owned());
                }
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"proc-pipe {version}
Bounded external process execution with piped I/O and timeouts

USAGE:
    proc-pipe [OPTIONS] [--] <COMMAND> [ARGS]...

OPTIONS:
    -t, --timeout <MS>        Timeout in milliseconds [default: 5000]
    -C, --cwd <DIR>           Working directory for the command
    -e, --env <KEY=VALUE>     Extra environment variable (repeatable)
    -i, --input <TEXT>        Feed TEXT to the command's standard input
        --accept <CODE>       Accept this exit code (repeatable) [default: 0]
        --ignore-exit-status  Accept any exit code
    -l, --log-level <LVL>     Log level (error, warn, info, debug, trace)
    -h, --help                Print help
    -V, --version             Print version

EXIT STATUS:
    Mirrors the command's exit code when it is not accepted; 124 on
    timeout; 127 when the command cannot be started; 2 on usage errors.

EXAMPLES:
    # Run with a 2 second budget
    proc-pipe -t 2000 -- cargo check

    # Filter text through a command
    proc-pipe -i HELLO -- tr A-Z a-z

    # Allow grep's "no match" exit code
    proc-pipe --accept 0 --accept 1 -- grep needle haystack.txt
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("proc-pipe {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

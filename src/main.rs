//! proc-pipe binary entry point.

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use proc_pipe::{cli, logging, ProcBuilder, ProcPipeError};

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("proc-pipe: {e}");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match &args.log_level {
        Some(level) => logging::init_with(&format!("proc_pipe={level}")),
        None => logging::init(),
    }

    let Some(command) = args.command.clone() else {
        cli::print_help();
        return ExitCode::from(2);
    };

    let mut builder = ProcBuilder::new(command)
        .args(args.args.iter().cloned())
        .envs(args.env.iter().cloned())
        // Stream output as it arrives instead of buffering it in memory.
        .output_stream(io::stdout());
    if let Some(millis) = args.timeout_millis {
        builder = builder.timeout(Duration::from_millis(millis));
    }
    if let Some(dir) = &args.working_dir {
        builder = match builder.working_dir(dir) {
            Ok(builder) => builder,
            Err(e) => {
                eprintln!("proc-pipe: {e}");
                return ExitCode::from(2);
            }
        };
    }
    if let Some(input) = args.input.clone() {
        builder = builder.input(input);
    }
    if args.ignore_exit_status {
        builder = builder.ignore_exit_status();
    } else if !args.accept.is_empty() {
        builder = builder.expect_exit_codes(args.accept.iter().copied());
    }

    match builder.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => report_failure(err),
    }
}

fn report_failure(err: ProcPipeError) -> ExitCode {
    let status = match &err {
        ProcPipeError::Startup { .. } => 127,
        ProcPipeError::Timeout { .. } => 124,
        ProcPipeError::ExitCode { code, stderr, .. } => {
            // The child's diagnostics belong on our stderr.
            let _ = io::stderr().write_all(stderr);
            u8::try_from(*code).unwrap_or(1)
        }
        _ => 1,
    };
    eprintln!("proc-pipe: {err}");
    ExitCode::from(status)
}

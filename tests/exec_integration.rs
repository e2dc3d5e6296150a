//! End-to-end execution tests.
//!
//! These exercise real child processes: deadlock avoidance under pipe
//! back-pressure, timeout enforcement, exit-code policy, and the
//! builder-reuse contract.
#![cfg(unix)]

use std::time::{Duration, Instant};

use proc_pipe::{execute, filter, run, ProcBuilder, ProcPipeError};
use tempfile::{NamedTempFile, TempDir};

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_echo_hello() {
    let result = ProcBuilder::new("echo").arg("hello").run().unwrap();
    assert_eq!(result.output_string().as_deref(), Some("hello\n"));
    assert_eq!(result.exit_code(), 0);
    assert!(result.elapsed() <= Duration::from_secs(5));
}

#[test]
fn test_command_line_display() {
    let result = ProcBuilder::new("echo").args(["a", "b"]).run().unwrap();
    assert_eq!(result.command_line(), "echo a b");
}

#[test]
fn test_false_is_non_conforming() {
    let err = ProcBuilder::new("false").run().unwrap_err();
    match err {
        ProcPipeError::ExitCode { code, .. } => assert_eq!(code, 1),
        other => panic!("expected ExitCode, got {other:?}"),
    }
}

#[test]
fn test_filter_through_tr() {
    assert_eq!(filter("HELLO", "tr", &["A-Z", "a-z"]).unwrap(), "hello");
}

#[test]
fn test_run_helper() {
    assert_eq!(run("echo", &["hello"]).unwrap(), "hello\n");
}

#[test]
fn test_startup_failure() {
    let err = ProcBuilder::new("proc-pipe-no-such-binary-2718")
        .run()
        .unwrap_err();
    assert!(matches!(err, ProcPipeError::Startup { .. }));
}

#[test]
fn test_sleeper_times_out() {
    let begun = Instant::now();
    let err = ProcBuilder::new("sleep")
        .arg("10")
        .timeout(Duration::from_millis(100))
        .run()
        .unwrap_err();
    let wall = begun.elapsed();

    match err {
        ProcPipeError::Timeout { elapsed, .. } => {
            assert!(elapsed >= Duration::from_millis(100));
            assert!(elapsed < Duration::from_secs(2), "elapsed was {elapsed:?}");
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert!(wall < Duration::from_secs(2));
}

#[test]
fn test_timeout_leaves_no_child_behind() {
    // A killed child stops appending to the marker file; a leaked one would
    // keep it growing.
    let marker = NamedTempFile::new().unwrap();
    let path = marker.path().to_str().unwrap().to_owned();

    let err = ProcBuilder::new("sh")
        .arg("-c")
        .arg(format!("while :; do echo tick >> {path}; sleep 0.02; done"))
        .timeout(Duration::from_millis(200))
        .run()
        .unwrap_err();
    assert!(matches!(err, ProcPipeError::Timeout { .. }));

    std::thread::sleep(Duration::from_millis(150));
    let size_after_kill = std::fs::metadata(marker.path()).unwrap().len();
    std::thread::sleep(Duration::from_millis(300));
    let size_later = std::fs::metadata(marker.path()).unwrap().len();
    assert_eq!(size_after_kill, size_later, "child kept running after timeout");
}

#[test]
fn test_timeout_carries_partial_output() {
    let err = ProcBuilder::new("sh")
        .arg("-c")
        .arg("echo early; sleep 10")
        .timeout(Duration::from_millis(300))
        .run()
        .unwrap_err();
    match err {
        ProcPipeError::Timeout { stdout, .. } => assert_eq!(stdout, b"early\n"),
        other => panic!("expected Timeout, got {other:?}"),
    }
}

// ============================================================================
// Deadlock avoidance
// ============================================================================

#[test]
fn test_large_io_on_all_three_streams() {
    // 4 MiB in, 4 MiB out on each of stdout and stderr: far beyond any OS
    // pipe buffer, so sequential draining would stall forever.
    let payload = vec![b'x'; 4 * 1024 * 1024];

    let result = ProcBuilder::new("tee")
        .arg("/dev/stderr")
        .input(payload.clone())
        .timeout(Duration::from_secs(60))
        .run()
        .unwrap();

    assert_eq!(result.output_bytes().map(|b| b.len()), Some(payload.len()));
    assert!(result.output_bytes() == Some(payload.as_slice()));
}

#[test]
fn test_oversized_input_is_not_an_error() {
    // `head` stops reading after 10 bytes; the remaining megabyte hits a
    // broken pipe, which is a normal way for a consumer to finish.
    let result = ProcBuilder::new("head")
        .args(["-c", "10"])
        .input(vec![b'y'; 1024 * 1024])
        .timeout(Duration::from_secs(30))
        .run()
        .unwrap();
    assert_eq!(result.output_bytes().map(|b| b.len()), Some(10));
}

#[test]
fn test_absent_input_closes_stdin() {
    // Without an input source stdin is closed at spawn; `cat` sees EOF
    // immediately instead of blocking until the timeout.
    let result = ProcBuilder::new("cat")
        .timeout(Duration::from_secs(2))
        .run()
        .unwrap();
    assert_eq!(result.output_bytes(), Some(&b""[..]));
}

#[test]
fn test_zero_byte_input_completes() {
    let result = ProcBuilder::new("cat").input("").run().unwrap();
    assert_eq!(result.output_string().as_deref(), Some(""));
}

#[test]
fn test_input_stream_source() {
    let result = ProcBuilder::new("cat")
        .input_stream(std::io::Cursor::new(b"streamed".to_vec()))
        .run()
        .unwrap();
    assert_eq!(result.output_string().as_deref(), Some("streamed"));
}

// ============================================================================
// Exit-code policy
// ============================================================================

#[test]
fn test_accepted_non_zero_exit_code() {
    let result = ProcBuilder::new("sh")
        .arg("-c")
        .arg("exit 3")
        .expect_exit_codes([0, 3])
        .run()
        .unwrap();
    assert_eq!(result.exit_code(), 3);
}

#[test]
fn test_ignore_exit_status_accepts_anything() {
    let result = ProcBuilder::new("false").ignore_exit_status().run().unwrap();
    assert_eq!(result.exit_code(), 1);
}

#[test]
fn test_exit_code_error_carries_stderr() {
    let err = ProcBuilder::new("sh")
        .arg("-c")
        .arg("echo oops >&2; exit 7")
        .run()
        .unwrap_err();
    match err {
        ProcPipeError::ExitCode { code, stderr, .. } => {
            assert_eq!(code, 7);
            assert_eq!(stderr, b"oops\n");
        }
        other => panic!("expected ExitCode, got {other:?}"),
    }
}

// ============================================================================
// Environment, working directory, sinks
// ============================================================================

#[test]
fn test_env_overlay() {
    let result = ProcBuilder::new("sh")
        .arg("-c")
        .arg("echo $PROC_PIPE_MARKER")
        .env("PROC_PIPE_MARKER", "present")
        .run()
        .unwrap();
    assert_eq!(result.output_string().as_deref(), Some("present\n"));
}

#[test]
fn test_working_dir_selects_cwd() {
    let dir = TempDir::new().unwrap();
    let canonical = dir.path().canonicalize().unwrap();

    let result = ProcBuilder::new("pwd")
        .working_dir(dir.path())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(
        result.output_string().unwrap().trim(),
        canonical.to_str().unwrap()
    );
}

#[test]
fn test_invalid_working_dir_rejected_at_config_time() {
    let err = ProcBuilder::new("pwd")
        .working_dir("/definitely/not/a/dir")
        .unwrap_err();
    assert!(matches!(err, ProcPipeError::WorkingDirectory(_)));
}

#[test]
fn test_external_sink_means_output_not_available() {
    let sink = NamedTempFile::new().unwrap();
    let handle = sink.reopen().unwrap();

    let result = ProcBuilder::new("echo")
        .arg("redirected")
        .output_stream(handle)
        .run()
        .unwrap();

    assert!(result.output_bytes().is_none());
    assert!(result.output_string().is_none());

    let written = std::fs::read_to_string(sink.path()).unwrap();
    assert_eq!(written, "redirected\n");
}

// ============================================================================
// Builder reuse
// ============================================================================

#[test]
fn test_builder_reuse_is_independent() {
    let mut builder = ProcBuilder::new("tr").args(["a-z", "A-Z"]).input("one");
    let first = builder.run().unwrap();
    assert_eq!(first.output_string().as_deref(), Some("ONE"));

    // The first run consumed the input; supply a fresh one.
    builder = builder.input("two");
    let second = builder.run().unwrap();
    assert_eq!(second.output_string().as_deref(), Some("TWO"));
}

#[test]
fn test_spec_can_drive_execute_directly() {
    let mut builder = ProcBuilder::new("echo").arg("direct");
    let result = execute(builder.build()).unwrap();
    assert_eq!(result.output_string().as_deref(), Some("direct\n"));
}

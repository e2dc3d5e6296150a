//! Execution result type.

use std::time::Duration;

/// Read-only view over a completed execution.
#[derive(Debug, Clone)]
pub struct ProcResult {
    command_line: String,
    output: Option<Vec<u8>>,
    exit_code: i32,
    elapsed: Duration,
}

impl ProcResult {
    pub(crate) fn new(
        command_line: String,
        output: Option<Vec<u8>>,
        exit_code: i32,
        elapsed: Duration,
    ) -> Self {
        Self {
            command_line,
            output,
            exit_code,
            elapsed,
        }
    }

    /// The command line in display form.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Captured standard output.
    ///
    /// `None` when the invocation redirected output to an external sink —
    /// the bytes went there, not here.
    pub fn output_bytes(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    /// Captured standard output as text (lossy UTF-8). `None` when an
    /// external sink was used.
    pub fn output_string(&self) -> Option<String> {
        self.output
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// The process's exit code.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Wall-clock time from spawn to resolution.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in whole milliseconds.
    pub fn elapsed_millis(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let result = ProcResult::new(
            "echo hi".into(),
            Some(b"hi\n".to_vec()),
            0,
            Duration::from_millis(12),
        );
        assert_eq!(result.command_line(), "echo hi");
        assert_eq!(result.output_bytes(), Some(&b"hi\n"[..]));
        assert_eq!(result.output_string().as_deref(), Some("hi\n"));
        assert_eq!(result.exit_code(), 0);
        assert_eq!(result.elapsed(), Duration::from_millis(12));
        assert_eq!(result.elapsed_millis(), 12);
    }

    #[test]
    fn test_output_not_available_with_external_sink() {
        let result = ProcResult::new("ls".into(), None, 0, Duration::ZERO);
        assert!(result.output_bytes().is_none());
        assert!(result.output_string().is_none());
    }

    #[test]
    fn test_lossy_output_string() {
        let result = ProcResult::new("x".into(), Some(vec![0xff, b'a']), 0, Duration::ZERO);
        assert_eq!(result.output_string().unwrap(), "\u{fffd}a");
    }
}

// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::ssh::{CommandError, ExecutionResult};
use serde::Serialize;
use std::io::Write;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Remote output plus a status line when the command failed
    Normal,
    /// Remote output only
    Quiet,
    /// One JSON object for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("{message}");
        }
    }

    /// Print the captured output of a remote command.
    pub fn result(&self, result: &ExecutionResult) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                print!("{}", result.stdout);
                let _ = std::io::stdout().flush();
                eprint!("{}", result.stderr);
                if let (OutputMode::Normal, Some(error)) = (self.mode, &result.error) {
                    eprintln!("Error: {error} ({:.1}s)", self.elapsed_secs());
                }
            }
            OutputMode::Json => {
                let event = JsonResult {
                    result,
                    exit_code: result.exit_code(),
                    duration_secs: self.start_time.map(|_| self.elapsed_secs()),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonError {
                    event: "error",
                    message,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

/// Process exit status mirroring a remote command.
///
/// The remote exit status is passed through (clamped to 255); any other
/// failure maps to 1.
pub fn exit_status(result: &ExecutionResult) -> u8 {
    match &result.error {
        None => 0,
        Some(CommandError::ExitStatus(code)) => u8::try_from(*code).unwrap_or(u8::MAX),
        Some(_) => 1,
    }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    #[serde(flatten)]
    result: &'a ExecutionResult,
    exit_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonError<'a> {
    event: &'a str,
    message: &'a str,
}

// ABOUTME: Captured output of a remote command and its failure descriptor.
// ABOUTME: A failed command is reported here, never as a call-level error.

use serde::{Serialize, Serializer};
use std::time::Duration;
use thiserror::Error;

/// Why a remote command did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("process exited with status {0}")]
    ExitStatus(u32),

    #[error("process killed by signal {signal}{}{}", core_note(.core_dumped), message_note(.message))]
    Signal {
        signal: String,
        core_dumped: bool,
        message: String,
    },

    #[error("server refused to execute the command")]
    Rejected,

    #[error("channel error: {0}")]
    Channel(String),

    #[error("channel closed without exit status")]
    ChannelClosed,

    #[error("command timed out after {0:?}")]
    Timeout(Duration),
}

fn core_note(core_dumped: &bool) -> &'static str {
    if *core_dumped { " (core dumped)" } else { "" }
}

fn message_note(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {message}")
    }
}

/// Output of a single `run` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    /// Standard output, decoded lossily as UTF-8.
    pub stdout: String,
    /// Standard error, decoded lossily as UTF-8.
    pub stderr: String,
    /// `None` when the command exited with status 0.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<CommandError>,
}

fn serialize_error<S: Serializer>(
    error: &Option<CommandError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Exit status of the remote process, if it reported one.
    pub fn exit_code(&self) -> Option<u32> {
        match &self.error {
            None => Some(0),
            Some(CommandError::ExitStatus(code)) => Some(*code),
            Some(_) => None,
        }
    }

    /// Stdout followed by stderr, separated by a newline when both are present.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Turn an embedded command failure into an `Err`.
    pub fn into_result(self) -> std::result::Result<Self, CommandError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

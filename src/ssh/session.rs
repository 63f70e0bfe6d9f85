// ABOUTME: An established connection that runs one command per call.
// ABOUTME: Captures stdout/stderr fully and embeds command failures in the result.

use super::error::{Error, Result};
use super::result::{CommandError, ExecutionResult};
use super::transport::{Channel, ChannelEvent, RusshTransport, Transport};
use std::time::Duration;

/// A live connection to a remote host.
///
/// `run` and `close` take `&mut self`, so one session serves one caller at a
/// time. Open a session per host for parallel work.
pub struct RemoteSession<T: Transport = RusshTransport> {
    transport: Option<T>,
    command_timeout: Option<Duration>,
}

impl<T: Transport> std::fmt::Debug for RemoteSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSession")
            .field("open", &self.transport.is_some())
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl<T: Transport> RemoteSession<T> {
    /// Wrap an already authenticated transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Some(transport),
            command_timeout: None,
        }
    }

    /// Give up on commands running longer than `timeout`.
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// Run `command` on a fresh channel and wait for it to finish.
    ///
    /// Only failing to open the channel is an `Err`. A command that exits
    /// non-zero, dies from a signal or loses its channel yields `Ok` with
    /// `ExecutionResult::error` set.
    pub async fn run(&mut self, command: &str) -> Result<ExecutionResult> {
        let transport = self.transport.as_ref().ok_or(Error::ClosedSession)?;

        let mut channel = transport.open_channel().await.map_err(Error::Session)?;
        tracing::debug!(command = %command, "executing remote command");

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let outcome = match self.command_timeout {
            Some(timeout) => tokio::time::timeout(
                timeout,
                execute(&mut channel, command, &mut stdout, &mut stderr),
            )
            .await
            .unwrap_or(Err(CommandError::Timeout(timeout))),
            None => execute(&mut channel, command, &mut stdout, &mut stderr).await,
        };

        let result = ExecutionResult {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            error: outcome.err(),
        };

        match &result.error {
            None => tracing::debug!(command = %command, "remote command succeeded"),
            Some(e) => tracing::debug!(command = %command, error = %e, "remote command failed"),
        }

        Ok(result)
    }

    /// Disconnect from the remote host. Calling it again does nothing.
    pub async fn close(&mut self) {
        let Some(transport) = self.transport.take() else {
            return;
        };
        match transport.disconnect().await {
            Ok(()) => tracing::info!("SSH session closed"),
            Err(e) => tracing::warn!("failed to disconnect cleanly: {}", e),
        }
    }
}

/// Send the exec request and drain the channel into the two sinks.
async fn execute<C: Channel>(
    channel: &mut C,
    command: &str,
    stdout: &mut Vec<u8>,
    stderr: &mut Vec<u8>,
) -> std::result::Result<(), CommandError> {
    channel
        .exec(command)
        .await
        .map_err(|e| CommandError::Channel(e.to_string()))?;

    let mut outcome = None;
    let mut got_eof = false;

    while let Some(event) = channel.next_event().await {
        match event {
            ChannelEvent::Stdout(data) => stdout.extend_from_slice(&data),
            ChannelEvent::Stderr(data) => stderr.extend_from_slice(&data),
            ChannelEvent::ExitStatus(0) => outcome = Some(Ok(())),
            ChannelEvent::ExitStatus(code) => outcome = Some(Err(CommandError::ExitStatus(code))),
            ChannelEvent::ExitSignal {
                signal,
                core_dumped,
                message,
            } => {
                outcome = Some(Err(CommandError::Signal {
                    signal,
                    core_dumped,
                    message,
                }))
            }
            ChannelEvent::Failure => return Err(CommandError::Rejected),
            ChannelEvent::Eof => got_eof = true,
            ChannelEvent::Close => break,
        }

        // Exit status may arrive on either side of EOF.
        if got_eof && outcome.is_some() {
            break;
        }
    }

    outcome.unwrap_or(Err(CommandError::ChannelClosed))
}

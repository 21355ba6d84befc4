// crates/vault-harness-launcher/src/client.rs
// ============================================================================
// Module: Control Client
// Description: Async JSON-lines client over the application's stdio.
// Purpose: Correlate typed requests with responses under strict deadlines.
// Dependencies: tokio, tracing, vault-harness-core
// ============================================================================

//! ## Overview
//! One JSON document per line in each direction. The client owns the child's
//! stdin and stdout, matches responses by correlation id, and relays the
//! application's progress-status events into tracing. Deadline expiry maps to
//! structured timeout errors; EOF maps to [`HarnessError::ChannelClosed`] so
//! callers can distinguish a dead application from a slow one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::io::Lines;
use tokio::process::ChildStdin;
use tokio::process::ChildStdout;
use tokio::time::timeout;
use tracing::debug;
use vault_harness_core::HarnessError;
use vault_harness_core::control::AppState;
use vault_harness_core::control::ControlEvent;
use vault_harness_core::control::ControlRequest;
use vault_harness_core::control::RequestId;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Typed stdio client for one application instance.
#[derive(Debug)]
pub(crate) struct ControlClient {
    /// Application stdin; requests are written here, one line each.
    writer: ChildStdin,
    /// Application stdout, line-framed.
    reader: Lines<BufReader<ChildStdout>>,
    /// Next correlation id to hand out.
    next_id: RequestId,
}

impl ControlClient {
    /// Wraps the child's stdio pipes.
    pub(crate) fn new(stdin: ChildStdin, stdout: ChildStdout) -> Self {
        Self { writer: stdin, reader: BufReader::new(stdout).lines(), next_id: 1 }
    }

    /// Reads the next event line, skipping blanks.
    async fn next_event(&mut self) -> Result<ControlEvent, HarnessError> {
        loop {
            let line = self.reader.next_line().await?.ok_or(HarnessError::ChannelClosed)?;
            if line.trim().is_empty() {
                continue;
            }
            return ControlEvent::from_line(&line);
        }
    }

    /// Awaits the unsolicited `ready` event.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::StartupTimeout`] when the deadline elapses and
    /// [`HarnessError::ChannelClosed`] when the application closes its stdout
    /// first.
    pub(crate) async fn wait_ready(
        &mut self,
        deadline: Duration,
    ) -> Result<(u32, String), HarnessError> {
        let wait = async {
            match self.next_event().await? {
                ControlEvent::Ready { pid, version } => Ok((pid, version)),
                other => Err(HarnessError::Protocol(format!(
                    "expected ready, got {}",
                    other.to_line().unwrap_or_else(|_| "<unencodable>".to_string())
                ))),
            }
        };
        timeout(deadline, wait)
            .await
            .map_err(|_| HarnessError::StartupTimeout { waited: deadline })?
    }

    /// Sends one request and awaits its completion.
    ///
    /// Progress-status events for the request are relayed to tracing;
    /// responses with a foreign correlation id are protocol violations
    /// because the channel is strictly sequential.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::CommandFailed`] when the application rejects
    /// the request and [`HarnessError::CommandTimeout`] when the deadline
    /// elapses.
    pub(crate) async fn request(
        &mut self,
        deadline: Duration,
        make: impl FnOnce(RequestId) -> ControlRequest,
    ) -> Result<AppState, HarnessError> {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        let request = make(id);
        self.send_line(&request.to_line()?).await?;

        let wait = async {
            loop {
                match self.next_event().await? {
                    ControlEvent::Completed { id: got, state } if got == id => return Ok(state),
                    ControlEvent::Failed { id: got, message } if got == id => {
                        return Err(HarnessError::CommandFailed(message));
                    }
                    ControlEvent::StatusStarted { id: got, label } if got == id => {
                        debug!(request = got, %label, "status scope opened");
                    }
                    ControlEvent::StatusEnded { id: got } if got == id => {
                        debug!(request = got, "status scope closed");
                    }
                    ControlEvent::Exiting => {}
                    other => {
                        return Err(HarnessError::Protocol(format!(
                            "unexpected event for request {id}: {}",
                            other.to_line().unwrap_or_else(|_| "<unencodable>".to_string())
                        )));
                    }
                }
            }
        };
        timeout(deadline, wait)
            .await
            .map_err(|_| HarnessError::CommandTimeout { waited: deadline })?
    }

    /// Sends an `exit` request without waiting for a response.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be written; a closed channel
    /// means the application is already gone and is reported as
    /// [`HarnessError::ChannelClosed`] by the underlying write.
    pub(crate) async fn send_exit(&mut self) -> Result<(), HarnessError> {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        let line = ControlRequest::Exit { id }.to_line()?;
        self.send_line(&line).await
    }

    /// Writes one request line and flushes.
    ///
    /// A write against a dead application fails with a broken pipe; that is
    /// the same terminal condition as an EOF on the read side and is reported
    /// as [`HarnessError::ChannelClosed`].
    async fn send_line(&mut self, line: &str) -> Result<(), HarnessError> {
        self.writer.write_all(line.as_bytes()).await.map_err(write_error)?;
        self.writer.write_all(b"\n").await.map_err(write_error)?;
        self.writer.flush().await.map_err(write_error)?;
        Ok(())
    }
}

/// Maps a stdin write failure to the channel-closed error when the pipe to
/// the application is gone.
fn write_error(err: std::io::Error) -> HarnessError {
    match err.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::UnexpectedEof => {
            HarnessError::ChannelClosed
        }
        _ => HarnessError::Io(err),
    }
}

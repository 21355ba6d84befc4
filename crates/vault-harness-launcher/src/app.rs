// crates/vault-harness-launcher/src/app.rs
// ============================================================================
// Module: Application Handle
// Description: Handle to one running instance of the vault application.
// Purpose: Expose the plugin-extension surface: database opens, plugin
//          policy, plugin loads, state queries, and teardown.
// Dependencies: tokio, tracing, vault-harness-core
// ============================================================================

//! ## Overview
//! A [`VaultApp`] owns the child process and its control channel through a
//! shared [`AppChannel`]; the instance registry keeps a weak reference to the
//! same channel so a later exit-all drain can reach instances whose handles
//! are still alive. The child is spawned with kill-on-drop, so dropping the
//! last handle reclaims the process even without a clean exit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::Instrument;
use tracing::info;
use tracing::info_span;
use tracing::warn;
use vault_harness_core::HarnessError;
use vault_harness_core::Passphrase;
use vault_harness_core::control::AppState;
use vault_harness_core::control::ControlRequest;
use vault_harness_core::timeouts::POLL_INTERVAL;

use crate::client::ControlClient;

// ============================================================================
// SECTION: Shared Channel
// ============================================================================

/// Child process plus its control client, shared between the handle and the
/// instance registry.
#[derive(Debug)]
pub(crate) struct AppChannel {
    /// The application child process.
    pub(crate) child: Child,
    /// Stdio control client for the process.
    pub(crate) control: ControlClient,
}

impl AppChannel {
    /// Returns `Some(status)` once the child has exited.
    pub(crate) fn exit_status(&mut self) -> Option<Option<i32>> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.code()),
            Ok(None) => None,
            // A wait failure means the process is no longer observable.
            Err(_) => Some(None),
        }
    }
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle to a launched, ready vault application instance.
#[derive(Debug)]
pub struct VaultApp {
    /// Shared child process and control channel.
    channel: Arc<Mutex<AppChannel>>,
    /// Working directory the instance was launched in.
    workdir: PathBuf,
    /// Fixture databases written for this launch, in open order.
    databases: Vec<PathBuf>,
    /// OS process id reported in the readiness event.
    pid: u32,
    /// Application version reported in the readiness event.
    version: String,
    /// Deadline applied to control requests and teardown waits.
    timeout: Duration,
}

impl VaultApp {
    /// Assembles a handle from launch results.
    pub(crate) const fn new(
        channel: Arc<Mutex<AppChannel>>,
        workdir: PathBuf,
        databases: Vec<PathBuf>,
        pid: u32,
        version: String,
        timeout: Duration,
    ) -> Self {
        Self { channel, workdir, databases, pid, version, timeout }
    }

    /// OS process id of the instance.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Version string the application reported at readiness.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Working directory the instance runs in.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Fixture databases written for this launch, in open order.
    #[must_use]
    pub fn databases(&self) -> &[PathBuf] {
        &self.databases
    }

    /// Queries the current application state.
    ///
    /// # Errors
    ///
    /// Returns a control-channel error when the application is gone or the
    /// deadline elapses.
    pub async fn state(&self) -> Result<AppState, HarnessError> {
        let mut channel = self.channel.lock().await;
        channel.control.request(self.timeout, |id| ControlRequest::QueryState { id }).await
    }

    /// Opens an additional database through the application's own file-open
    /// entry point.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::CommandFailed`] when the application rejects
    /// the database or passphrase.
    pub async fn open_database(
        &self,
        path: &Path,
        passphrase: &Passphrase,
    ) -> Result<AppState, HarnessError> {
        let mut channel = self.channel.lock().await;
        channel
            .control
            .request(self.timeout, |id| ControlRequest::OpenDatabase {
                id,
                path: path.to_path_buf(),
                passphrase: passphrase.clone(),
            })
            .await
    }

    /// Flips the plugin subsystem policy flag.
    ///
    /// # Errors
    ///
    /// Returns a control-channel error when the application is gone or the
    /// deadline elapses.
    pub async fn set_plugin_policy(&self, enabled: bool) -> Result<AppState, HarnessError> {
        let mut channel = self.channel.lock().await;
        channel
            .control
            .request(self.timeout, |id| ControlRequest::SetPluginPolicy { id, enabled })
            .await
    }

    /// Loads a packaged plugin artifact through the application's own loader,
    /// inside a progress-status scope.
    ///
    /// The artifact is not validated locally; the application's verdict is
    /// relayed verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::CommandFailed`] with the application's message
    /// when the loader rejects the artifact.
    pub async fn load_plugin(&self, artifact: &Path) -> Result<AppState, HarnessError> {
        let span = info_span!("plugin_load", artifact = %artifact.display(), pid = self.pid);
        async {
            info!("plugin load started");
            let mut channel = self.channel.lock().await;
            let result = channel
                .control
                .request(self.timeout, |id| ControlRequest::LoadPlugin {
                    id,
                    path: artifact.to_path_buf(),
                })
                .await;
            drop(channel);
            match &result {
                Ok(_) => info!("plugin load finished"),
                Err(err) => warn!(error = %err, "plugin load failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Requests a clean exit and waits for the process to end.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ShutdownTimeout`] when the process is still
    /// alive after the deadline; the process is left running in that case so
    /// the caller can decide between waiting longer and [`Self::kill`].
    pub async fn exit(&self, deadline: Duration) -> Result<(), HarnessError> {
        {
            let mut channel = self.channel.lock().await;
            if channel.exit_status().is_some() {
                return Ok(());
            }
            // A write failure here means the process is already going away.
            if let Err(err) = channel.control.send_exit().await {
                warn!(pid = self.pid, error = %err, "exit request not delivered");
            }
        }
        let waited = tokio::time::Instant::now();
        loop {
            {
                let mut channel = self.channel.lock().await;
                if channel.exit_status().is_some() {
                    info!(pid = self.pid, "vault application exited");
                    return Ok(());
                }
            }
            if waited.elapsed() >= deadline {
                return Err(HarnessError::ShutdownTimeout { waited: deadline });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Forcibly terminates the process.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the OS refuses the kill.
    pub async fn kill(&self) -> Result<(), HarnessError> {
        let mut channel = self.channel.lock().await;
        warn!(pid = self.pid, "killing vault application");
        channel.child.kill().await?;
        Ok(())
    }
}

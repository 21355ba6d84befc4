// crates/vault-harness-launcher/src/launch.rs
// ============================================================================
// Module: Launch Sequence
// Description: Shared startup/synchronization routine for both variants.
// Purpose: Drain old instances, stage fixtures, spawn the application, wait
//          for readiness, open the remaining databases, and re-enable the
//          plugin policy.
// Dependencies: tokio, tracing, vault-harness-core
// ============================================================================

//! ## Overview
//! One launch routine backs both public variants. [`Launcher`] runs the
//! application in its own install directory and requires at least one
//! database; the isolated variant points the same routine at a private
//! scratch directory and also accepts zero databases. The routine validates
//! everything it can before any process work, and every wait is bounded by
//! the resolved deadline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;
use vault_harness_core::HarnessError;
use vault_harness_core::LaunchOptions;
use vault_harness_core::control::ControlRequest;
use vault_harness_core::fixtures;
use vault_harness_core::timeouts::resolve_timeout;

use crate::app::AppChannel;
use crate::app::VaultApp;
use crate::client::ControlClient;
use crate::registry::InstanceRegistry;

// ============================================================================
// SECTION: Launcher
// ============================================================================

/// Launches the vault application in its own install directory.
///
/// This is the shared variant: all launches target the directory containing
/// the executable, and `exit_all_first` drains every instance this harness
/// process started before a new one comes up.
#[derive(Debug)]
pub struct Launcher {
    /// Path to the vault application executable.
    exe: PathBuf,
    /// Registry consulted for the exit-all drain.
    registry: &'static InstanceRegistry,
}

impl Launcher {
    /// Creates a launcher for the given executable path.
    #[must_use]
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into(), registry: InstanceRegistry::global() }
    }

    /// Registry used by this launcher's exit-all drain.
    #[must_use]
    pub const fn registry(&self) -> &'static InstanceRegistry {
        self.registry
    }

    /// Launches the application with the given options.
    ///
    /// # Errors
    ///
    /// Fails fast with [`HarnessError::DatabaseCountOutOfRange`] when fewer
    /// than one database is requested; afterwards any fixture, spawn, or
    /// synchronization failure aborts the launch.
    pub async fn launch(&self, options: &LaunchOptions) -> Result<VaultApp, HarnessError> {
        // The shared variant always opens the first database from argv.
        options.databases.require_at_least(1)?;
        let workdir = self
            .exe
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .ok_or_else(|| HarnessError::WorkDirMissing { path: self.exe.clone() })?;
        launch_in_dir(&self.exe, &workdir, options, self.registry).await
    }

    /// Asks every instance this harness started to exit and waits for the
    /// drain to finish.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ExitAllTimeout`] when instances remain after
    /// the deadline.
    pub async fn exit_all(&self, deadline: Duration) -> Result<(), HarnessError> {
        let deadline = resolve_timeout(deadline)?;
        self.registry.exit_all(deadline).await
    }
}

// ============================================================================
// SECTION: Shared Sequence
// ============================================================================

/// Runs the full launch sequence in `workdir`.
pub(crate) async fn launch_in_dir(
    exe: &Path,
    workdir: &Path,
    options: &LaunchOptions,
    registry: &'static InstanceRegistry,
) -> Result<VaultApp, HarnessError> {
    let deadline = resolve_timeout(options.timeout)?;

    if options.exit_all_first {
        registry.exit_all(deadline).await?;
    }

    if !workdir.is_dir() {
        return Err(HarnessError::WorkDirMissing { path: workdir.to_path_buf() });
    }
    if !exe.is_file() {
        return Err(HarnessError::ExecutableNotFound { path: exe.to_path_buf() });
    }

    if options.fresh_config {
        fixtures::write_config(workdir)?;
    }
    let databases = fixtures::write_databases(workdir, options.databases)?;

    let args = options.to_args(databases.first().map(PathBuf::as_path));
    info!(exe = %exe.display(), workdir = %workdir.display(), "starting vault application");
    let mut child = Command::new(exe)
        .args(&args)
        .current_dir(workdir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(HarnessError::Spawn)?;

    let stdin = child.stdin.take().ok_or(HarnessError::ChannelClosed)?;
    let stdout = child.stdout.take().ok_or(HarnessError::ChannelClosed)?;
    let mut control = ControlClient::new(stdin, stdout);

    let (pid, version) = match control.wait_ready(deadline).await {
        Ok(ready) => ready,
        Err(HarnessError::ChannelClosed) => {
            // The application died before readiness; report its exit status
            // rather than a timeout.
            let status = child.wait().await.ok().and_then(|status| status.code());
            return Err(HarnessError::AppExited { status });
        }
        Err(err) => return Err(err),
    };
    info!(pid, %version, "vault application ready");

    // The first database is opened by argv; the rest go through the
    // application's file-open entry point with the same passphrase.
    for database in databases.iter().skip(1) {
        control
            .request(deadline, |id| ControlRequest::OpenDatabase {
                id,
                path: database.clone(),
                passphrase: options.passphrase.clone(),
            })
            .await?;
        info!(database = %database.display(), "additional database opened");
    }

    // The canned configuration disables plugins so none load during startup;
    // re-enable the policy now so the plugin dialog is reachable.
    control.request(deadline, |id| ControlRequest::SetPluginPolicy { id, enabled: true }).await?;
    info!(pid, "plugin policy re-enabled");

    let channel = Arc::new(AsyncMutex::new(AppChannel { child, control }));
    registry.register(pid, &channel);
    Ok(VaultApp::new(channel, workdir.to_path_buf(), databases, pid, version, deadline))
}

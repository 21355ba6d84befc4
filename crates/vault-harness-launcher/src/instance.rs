// crates/vault-harness-launcher/src/instance.rs
// ============================================================================
// Module: Isolated Instance
// Description: Single-use launch context with a private working directory.
// Purpose: Run multiple independent application instances in one test
//          session by isolating each in its own OS process and directory.
// Dependencies: tempfile, tokio, tracing, vault-harness-core
// ============================================================================

//! ## Overview
//! An [`AppInstance`] owns a scratch working directory and at most one child
//! process. Older harnesses ran a second copy of the application's
//! process-wide singleton inside an in-process isolated context; here the
//! isolation is the OS process boundary, and the single-start rule is kept:
//! a second `start` on the same instance fails with
//! [`HarnessError::AlreadyStarted`] before any process work.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tracing::info;
use tracing::warn;
use vault_harness_core::HarnessError;
use vault_harness_core::LaunchOptions;

use crate::app::VaultApp;
use crate::launch::launch_in_dir;
use crate::registry::InstanceRegistry;

// ============================================================================
// SECTION: Instance
// ============================================================================

/// A single-use, directory-isolated launch context for the vault application.
#[derive(Debug)]
pub struct AppInstance {
    /// Path to the vault application executable.
    exe: PathBuf,
    /// Private working directory; removed when the instance is dropped.
    scratch: TempDir,
    /// Whether a launch has already succeeded in this instance.
    started: bool,
    /// Handle to the running application, if any.
    app: Option<VaultApp>,
}

impl AppInstance {
    /// Creates a fresh instance with its own scratch working directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the scratch directory cannot be created.
    pub fn new(exe: impl Into<PathBuf>) -> Result<Self, HarnessError> {
        let scratch = TempDir::with_prefix("vault-harness-instance-")?;
        Ok(Self { exe: exe.into(), scratch, started: false, app: None })
    }

    /// Private working directory of this instance.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        self.scratch.path()
    }

    /// Whether a launch has already succeeded in this instance.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Handle to the running application, when started.
    #[must_use]
    pub const fn app(&self) -> Option<&VaultApp> {
        self.app.as_ref()
    }

    /// Launches the application inside this instance's scratch directory.
    ///
    /// Unlike the shared variant, zero databases are accepted: the
    /// application then starts with no database and no passphrase argument.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::AlreadyStarted`] when a launch already
    /// succeeded here; afterwards any fixture, spawn, or synchronization
    /// failure aborts the launch and leaves the instance restartable.
    pub async fn start(&mut self, options: &LaunchOptions) -> Result<&VaultApp, HarnessError> {
        if self.started {
            return Err(HarnessError::AlreadyStarted);
        }
        let app =
            launch_in_dir(&self.exe, self.scratch.path(), options, InstanceRegistry::global())
                .await?;
        info!(pid = app.pid(), workdir = %self.scratch.path().display(), "isolated instance ready");
        self.started = true;
        self.app = Some(app);
        // The borrow is re-taken from the freshly stored handle.
        self.app.as_ref().ok_or(HarnessError::ChannelClosed)
    }

    /// Exits the application and reclaims the instance.
    ///
    /// Issues a clean exit command first; when the process is still alive
    /// after `deadline` it is killed. The scratch directory is removed when
    /// the returned instance value is dropped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when a forced kill fails.
    pub async fn shutdown(mut self, deadline: Duration) -> Result<(), HarnessError> {
        if let Some(app) = self.app.take() {
            match app.exit(deadline).await {
                Ok(()) => {}
                Err(err) if err.is_timeout() => {
                    warn!(pid = app.pid(), "clean exit timed out, killing instance");
                    app.kill().await?;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

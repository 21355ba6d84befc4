// crates/vault-harness-launcher/src/plugin.rs
// ============================================================================
// Module: Plugin Artifact Builder
// Description: Invokes the application's own plugin-artifact build mode.
// Purpose: Package a plugin project into an artifact the application's
//          loader accepts, without reimplementing the packaging locally.
// Dependencies: tokio, tracing, vault-harness-core
// ============================================================================

//! ## Overview
//! The vault application can package a plugin project into a loadable
//! artifact when started in build mode. The harness only assembles the
//! argument list and delegates; all validation and packaging happens inside
//! the application. Loading a built artifact goes through
//! [`crate::VaultApp::load_plugin`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use tokio::process::Command;
use tracing::info;
use vault_harness_core::HarnessError;

// ============================================================================
// SECTION: Build Options
// ============================================================================

/// Options for the application's plugin-artifact build mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginBuildOptions {
    /// Plugin project directory to package.
    pub project_path: Option<PathBuf>,
    /// Minimum application version the artifact requires.
    pub app_version: Option<String>,
    /// Minimum runtime version the artifact requires.
    pub runtime_version: Option<String>,
    /// Operating system the artifact requires.
    pub os: Option<String>,
    /// Pointer width the artifact requires.
    pub pointer_size: Option<String>,
    /// Command the application runs before building.
    pub pre_build: Option<String>,
    /// Command the application runs after building.
    pub post_build: Option<String>,
}

impl PluginBuildOptions {
    /// Builds the argument list for the application's build mode.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["--plugin-create".to_string()];
        if let Some(project) = &self.project_path {
            args.push(project.display().to_string());
        }
        if let Some(version) = &self.app_version {
            args.push(format!("--plugin-prereq-app:{version}"));
        }
        if let Some(version) = &self.runtime_version {
            args.push(format!("--plugin-prereq-runtime:{version}"));
        }
        if let Some(os) = &self.os {
            args.push(format!("--plugin-prereq-os:{os}"));
        }
        if let Some(pointer_size) = &self.pointer_size {
            args.push(format!("--plugin-prereq-ptr:{pointer_size}"));
        }
        if let Some(command) = &self.pre_build {
            args.push(format!("--plugin-build-pre:{command}"));
        }
        if let Some(command) = &self.post_build {
            args.push(format!("--plugin-build-post:{command}"));
        }
        args
    }
}

// ============================================================================
// SECTION: Build Invocation
// ============================================================================

/// Runs the application in plugin-artifact build mode and waits for it to
/// finish.
///
/// # Errors
///
/// Returns [`HarnessError::ExecutableNotFound`] when `exe` does not exist,
/// [`HarnessError::Spawn`] when the process cannot start, and
/// [`HarnessError::CommandFailed`] when the build exits non-zero.
pub async fn build_plugin_artifact(
    exe: &Path,
    options: &PluginBuildOptions,
) -> Result<(), HarnessError> {
    if !exe.is_file() {
        return Err(HarnessError::ExecutableNotFound { path: exe.to_path_buf() });
    }
    let args = options.to_args();
    info!(exe = %exe.display(), "building plugin artifact");
    let status =
        Command::new(exe).args(&args).status().await.map_err(HarnessError::Spawn)?;
    if !status.success() {
        return Err(HarnessError::CommandFailed(format!(
            "plugin artifact build exited with status {status}"
        )));
    }
    info!("plugin artifact build finished");
    Ok(())
}

// crates/vault-harness-launcher/src/lib.rs
// ============================================================================
// Module: Vault Harness Launcher
// Description: Process launch, synchronization, and teardown for the vault
//              application under test.
// Purpose: Start instances of the external application with known fixtures,
//          wait for readiness under strict deadlines, and expose a typed
//          handle for driving databases and plugins.
// Dependencies: tokio, tracing, tempfile, vault-harness-core
// ============================================================================

//! ## Overview
//! Two launch variants exist. [`Launcher`] starts the application in its own
//! install directory and drains previously launched instances first when
//! asked. [`AppInstance`] gives each launch a private scratch working
//! directory so multiple independent instances can coexist in one test
//! session; it accepts a single `start` per instance and tears the process
//! down on shutdown. Both share one launch sequence and return a
//! [`VaultApp`] handle speaking the stdio control protocol.
//! Invariants:
//! - Exactly one readiness wait precedes any control request.
//! - Every bounded wait resolves to a structured error, never a prompt.
//! - After a successful launch the plugin policy flag is enabled even though
//!   the canned configuration disabled it.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod app;
mod client;
mod instance;
mod launch;
mod plugin;
mod registry;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use app::VaultApp;
pub use instance::AppInstance;
pub use launch::Launcher;
pub use plugin::PluginBuildOptions;
pub use plugin::build_plugin_artifact;
pub use registry::InstanceRegistry;

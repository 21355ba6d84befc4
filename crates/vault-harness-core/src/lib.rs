// crates/vault-harness-core/src/lib.rs
// ============================================================================
// Module: Vault Harness Core
// Description: Wire types, fixtures, and error taxonomy for the vault harness.
// Purpose: Provide the launch-independent building blocks shared by the
//          launcher, the CLI, and the system-test stub application.
// Dependencies: serde, serde_json, thiserror, toml
// ============================================================================

//! ## Overview
//! Core types for driving the vault application under test: the control
//! protocol spoken over the child process's stdio, the fixture files copied
//! into the application's working directory before each launch, the launch
//! options and their argument grammar, and the structured error taxonomy.
//! Invariants:
//! - Fixture files exist before any process is spawned.
//! - Database counts are validated before any filesystem or process work.
//! - Every bounded wait resolves to a structured error, never a prompt.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod control;
pub mod errors;
pub mod fixtures;
pub mod options;
pub mod timeouts;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use config::AppConfig;
pub use control::AppState;
pub use control::ControlEvent;
pub use control::ControlRequest;
pub use errors::HarnessError;
pub use options::DatabaseCount;
pub use options::LaunchOptions;
pub use options::Passphrase;

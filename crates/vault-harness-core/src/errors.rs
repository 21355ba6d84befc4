// crates/vault-harness-core/src/errors.rs
// ============================================================================
// Module: Vault Harness Errors
// Description: Structured error taxonomy for launch and control operations.
// Purpose: Replace prompt-driven failure handling with typed, terminal errors.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure in the harness is terminal to the current operation and is
//! reported through [`HarnessError`]. Timeouts carry the elapsed deadline so
//! callers can decide whether to retry; the harness itself never blocks on an
//! operator prompt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// ============================================================================
// SECTION: Error Types
// ============================================================================

/// Errors produced while launching, driving, or tearing down the vault
/// application.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Timeout variants carry the deadline that elapsed.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A database count outside the accepted range was requested.
    #[error("database count {requested} is out of range (minimum {minimum})")]
    DatabaseCountOutOfRange {
        /// Raw requested count.
        requested: i64,
        /// Smallest count the operation accepts.
        minimum: u32,
    },
    /// The vault application executable does not exist.
    #[error("vault application executable not found: {path}")]
    ExecutableNotFound {
        /// Path that was probed.
        path: PathBuf,
    },
    /// The working directory for the launch does not exist.
    #[error("working directory does not exist: {path}")]
    WorkDirMissing {
        /// Directory that was probed.
        path: PathBuf,
    },
    /// Writing a fixture or configuration file failed.
    #[error("failed to write fixture {path}: {source}")]
    Fixture {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// Spawning the vault application process failed.
    #[error("failed to spawn vault application: {0}")]
    Spawn(#[source] io::Error),
    /// The application did not report readiness within the deadline.
    #[error("vault application not ready after {waited:?}")]
    StartupTimeout {
        /// Deadline that elapsed.
        waited: Duration,
    },
    /// The application did not exit within the deadline.
    #[error("vault application still running after {waited:?}")]
    ShutdownTimeout {
        /// Deadline that elapsed.
        waited: Duration,
    },
    /// The application did not answer a control request within the deadline.
    #[error("vault application did not answer within {waited:?}")]
    CommandTimeout {
        /// Deadline that elapsed.
        waited: Duration,
    },
    /// Previously launched instances did not drain within the deadline.
    #[error("{} instance(s) still running after {waited:?}", .remaining.len())]
    ExitAllTimeout {
        /// Deadline that elapsed.
        waited: Duration,
        /// Pids of the instances that refused to exit.
        remaining: Vec<u32>,
    },
    /// A second start was requested on an instance that already ran.
    #[error("vault application was already started in this instance")]
    AlreadyStarted,
    /// The application exited before completing the requested operation.
    #[error("vault application exited unexpectedly (status {status:?})")]
    AppExited {
        /// Exit code reported by the OS, when available.
        status: Option<i32>,
    },
    /// The control channel closed before a response arrived.
    #[error("control channel closed by the vault application")]
    ChannelClosed,
    /// A control message could not be encoded or decoded.
    #[error("control protocol violation: {0}")]
    Protocol(String),
    /// The application rejected a control request.
    #[error("vault application rejected the command: {0}")]
    CommandFailed(String),
    /// The application configuration blob could not be encoded or decoded.
    #[error("configuration blob error: {0}")]
    Config(String),
    /// A harness environment variable failed validation.
    #[error("invalid environment configuration: {0}")]
    Environment(String),
    /// An I/O failure outside fixture writing.
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
}

impl HarnessError {
    /// Returns `true` when the error is a deadline expiry that a caller may
    /// reasonably retry by waiting longer.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::StartupTimeout { .. }
                | Self::ShutdownTimeout { .. }
                | Self::CommandTimeout { .. }
                | Self::ExitAllTimeout { .. }
        )
    }
}

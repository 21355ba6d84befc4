// crates/vault-harness-core/src/control.rs
// ============================================================================
// Module: Control Protocol
// Description: JSON-lines request/response types for driving the application.
// Purpose: Replace in-process UI invocation with a typed stdio command channel.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The harness drives the vault application over its stdio: one JSON document
//! per line. Requests carry a correlation id; the application answers each
//! with `completed` or `failed` and may emit unsolicited events (`ready`
//! exactly once after startup, `status_*` around plugin loads, `exiting`
//! before shutdown). Exactly one readiness event precedes any request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::HarnessError;
use crate::options::Passphrase;

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// Correlation id for a control request.
pub type RequestId = u64;

/// A command sent to the vault application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlRequest {
    /// Open an additional database through the application's file-open entry
    /// point.
    OpenDatabase {
        /// Correlation id.
        id: RequestId,
        /// Database file to open.
        path: PathBuf,
        /// Passphrase for the database.
        passphrase: Passphrase,
    },
    /// Flip the plugin subsystem policy flag.
    SetPluginPolicy {
        /// Correlation id.
        id: RequestId,
        /// New policy value.
        enabled: bool,
    },
    /// Load a packaged plugin artifact through the application's own loader.
    LoadPlugin {
        /// Correlation id.
        id: RequestId,
        /// Path to the plugin artifact; passed through unvalidated.
        path: PathBuf,
    },
    /// Report the current application state.
    QueryState {
        /// Correlation id.
        id: RequestId,
    },
    /// Exit the application cleanly.
    Exit {
        /// Correlation id.
        id: RequestId,
    },
}

impl ControlRequest {
    /// Returns the correlation id of the request.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        match self {
            Self::OpenDatabase { id, .. }
            | Self::SetPluginPolicy { id, .. }
            | Self::LoadPlugin { id, .. }
            | Self::QueryState { id }
            | Self::Exit { id } => *id,
        }
    }

    /// Encodes the request as a single JSON line (no trailing newline).
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Protocol`] when serialization fails.
    pub fn to_line(&self) -> Result<String, HarnessError> {
        serde_json::to_string(self).map_err(|err| HarnessError::Protocol(err.to_string()))
    }

    /// Decodes a request from one JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Protocol`] when the line is not a valid
    /// request document.
    pub fn from_line(line: &str) -> Result<Self, HarnessError> {
        serde_json::from_str(line).map_err(|err| HarnessError::Protocol(err.to_string()))
    }
}

// ============================================================================
// SECTION: Event Types
// ============================================================================

/// Snapshot of the application state returned with every completion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppState {
    /// Databases currently open, in open order.
    pub open_databases: Vec<PathBuf>,
    /// Current plugin subsystem policy flag.
    pub plugins_enabled: bool,
    /// Names of plugins loaded in this session.
    pub loaded_plugins: Vec<String>,
}

/// An event emitted by the vault application on its stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControlEvent {
    /// The main window and extension surface are available. Emitted exactly
    /// once, before any response.
    Ready {
        /// OS process id of the application.
        pid: u32,
        /// Application version string.
        version: String,
    },
    /// A request completed; carries the post-command state snapshot.
    Completed {
        /// Correlation id of the request.
        id: RequestId,
        /// State after the command was applied.
        state: AppState,
    },
    /// A request was rejected or failed inside the application.
    Failed {
        /// Correlation id of the request.
        id: RequestId,
        /// Application-provided failure message, relayed verbatim.
        message: String,
    },
    /// A progress-status scope opened for a long-running request.
    StatusStarted {
        /// Correlation id of the request.
        id: RequestId,
        /// Human-readable scope label (for plugin loads, the artifact path).
        label: String,
    },
    /// The progress-status scope for a request closed.
    StatusEnded {
        /// Correlation id of the request.
        id: RequestId,
    },
    /// The application is about to exit.
    Exiting,
}

impl ControlEvent {
    /// Encodes the event as a single JSON line (no trailing newline).
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Protocol`] when serialization fails.
    pub fn to_line(&self) -> Result<String, HarnessError> {
        serde_json::to_string(self).map_err(|err| HarnessError::Protocol(err.to_string()))
    }

    /// Decodes an event from one JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Protocol`] when the line is not a valid event
    /// document.
    pub fn from_line(line: &str) -> Result<Self, HarnessError> {
        serde_json::from_str(line).map_err(|err| HarnessError::Protocol(err.to_string()))
    }
}

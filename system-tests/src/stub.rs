// system-tests/src/stub.rs
// ============================================================================
// Module: Stub Vault Application
// Description: In-memory model of the vault application under test.
// Purpose: Reproduce the argument grammar, configuration handling, and
//          control protocol of the external application for the suites.
// Dependencies: serde_json, vault-harness-core
// ============================================================================

//! ## Overview
//! The stub models exactly what the harness observes of the real
//! application: it parses the startup argument grammar, honors the
//! configuration blob's plugin policy, verifies database passphrases against
//! the fixture format, and answers control requests. Databases are never
//! decrypted; the fixture format carries its passphrase in the clear.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use vault_harness_core::AppConfig;
use vault_harness_core::control::AppState;
use vault_harness_core::control::ControlEvent;
use vault_harness_core::control::ControlRequest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Version string the stub reports in its readiness event.
pub const STUB_VERSION: &str = "2.51.0";

/// File extension the stub's plugin loader accepts.
pub const PLUGIN_EXTENSION: &str = "vplugin";

/// Env knob: milliseconds to sleep before emitting `ready`.
pub const ENV_STARTUP_DELAY_MS: &str = "VAULT_STUB_STARTUP_DELAY_MS";

/// Env knob: milliseconds to sleep before answering each request.
pub const ENV_RESPONSE_DELAY_MS: &str = "VAULT_STUB_RESPONSE_DELAY_MS";

/// Env knob: when set, `exit` requests are ignored (stuck-instance tests).
pub const ENV_IGNORE_EXIT: &str = "VAULT_STUB_IGNORE_EXIT";

// ============================================================================
// SECTION: Argument Grammar
// ============================================================================

/// Startup options parsed from the application argument grammar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StubOptions {
    /// Database to open at startup.
    pub database: Option<PathBuf>,
    /// Passphrase from the `-pw:` flag.
    pub passphrase: Option<String>,
    /// Debug flag was passed.
    pub debug: bool,
    /// Plugin-artifact saving flag was passed.
    pub save_plugin_artifacts: bool,
}

/// Parses the argument list the harness constructs.
///
/// # Errors
///
/// Returns a message naming the first unknown flag.
pub fn parse_args(args: &[String]) -> Result<StubOptions, String> {
    let mut options = StubOptions::default();
    for arg in args {
        if let Some(secret) = arg.strip_prefix("-pw:") {
            options.passphrase = Some(secret.to_string());
        } else if arg == "--debug" {
            options.debug = true;
        } else if arg == "--save-plugin-artifacts" {
            options.save_plugin_artifacts = true;
        } else if arg.starts_with('-') {
            return Err(format!("unknown flag: {arg}"));
        } else if options.database.is_none() {
            options.database = Some(PathBuf::from(arg));
        } else {
            return Err(format!("unexpected positional argument: {arg}"));
        }
    }
    Ok(options)
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// One running application session.
#[derive(Debug)]
pub struct Session {
    /// Observable application state.
    state: AppState,
    /// `exit` requests are ignored when set.
    ignore_exit: bool,
}

/// Outcome of handling one control request.
#[derive(Debug, PartialEq, Eq)]
pub struct Handled {
    /// Events to emit, in order.
    pub events: Vec<ControlEvent>,
    /// The session should terminate after emitting the events.
    pub exit: bool,
}

impl Session {
    /// Creates a session honoring the configuration blob's plugin policy.
    /// Without a blob the application default applies: plugins enabled.
    #[must_use]
    pub fn new(config: Option<&AppConfig>, ignore_exit: bool) -> Self {
        let plugins_enabled = config.is_none_or(|config| config.plugins.enabled);
        Self {
            state: AppState { plugins_enabled, ..AppState::default() },
            ignore_exit,
        }
    }

    /// Current observable state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Opens a database after verifying the fixture passphrase.
    ///
    /// # Errors
    ///
    /// Returns a message when the file is missing, unreadable, or the
    /// passphrase does not match.
    pub fn open_database(&mut self, path: &Path, passphrase: &str) -> Result<(), String> {
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("cannot read database {}: {err}", path.display()))?;
        let document: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|err| format!("database {} is not a vault database: {err}", path.display()))?;
        let expected = document
            .get("passphrase")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| format!("database {} has no passphrase record", path.display()))?;
        if expected != passphrase {
            return Err(format!("wrong passphrase for {}", path.display()));
        }
        self.state.open_databases.push(path.to_path_buf());
        Ok(())
    }

    /// Loads a plugin artifact through the stub's loader rules.
    fn load_plugin(&mut self, path: &Path) -> Result<(), String> {
        if !self.state.plugins_enabled {
            return Err("plugin subsystem policy is disabled".to_string());
        }
        if !path.is_file() {
            return Err(format!("plugin artifact not found: {}", path.display()));
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some(PLUGIN_EXTENSION) {
            return Err(format!("unsupported plugin artifact: {}", path.display()));
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("plugin")
            .to_string();
        self.state.loaded_plugins.push(name);
        Ok(())
    }

    /// Handles one control request and returns the events to emit.
    #[must_use]
    pub fn handle(&mut self, request: ControlRequest) -> Handled {
        match request {
            ControlRequest::OpenDatabase { id, path, passphrase } => {
                let result = self.open_database(&path, passphrase.as_str());
                Handled { events: vec![self.completion(id, result)], exit: false }
            }
            ControlRequest::SetPluginPolicy { id, enabled } => {
                self.state.plugins_enabled = enabled;
                Handled { events: vec![self.completion(id, Ok(()))], exit: false }
            }
            ControlRequest::LoadPlugin { id, path } => {
                // The status scope opens before the loader runs and closes
                // after, regardless of the verdict.
                let mut events = vec![ControlEvent::StatusStarted {
                    id,
                    label: path.display().to_string(),
                }];
                let result = self.load_plugin(&path);
                events.push(ControlEvent::StatusEnded { id });
                events.push(self.completion(id, result));
                Handled { events, exit: false }
            }
            ControlRequest::QueryState { id } => {
                Handled { events: vec![self.completion(id, Ok(()))], exit: false }
            }
            ControlRequest::Exit { id: _ } => {
                if self.ignore_exit {
                    // Stuck-instance mode: swallow the request entirely.
                    return Handled { events: Vec::new(), exit: false };
                }
                Handled { events: vec![ControlEvent::Exiting], exit: true }
            }
        }
    }

    /// Maps a request outcome to its response event.
    fn completion(&self, id: u64, result: Result<(), String>) -> ControlEvent {
        match result {
            Ok(()) => ControlEvent::Completed { id, state: self.state.clone() },
            Err(message) => ControlEvent::Failed { id, message },
        }
    }
}

// crates/vault-harness-core/src/options.rs
// ============================================================================
// Module: Launch Options
// Description: Validated launch parameters and the application argument grammar.
// Purpose: Keep range checks and argv construction ahead of any process work.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Launch parameters for the vault application. [`DatabaseCount`] validates
//! the requested fixture count before any filesystem or process work;
//! [`LaunchOptions::to_args`] reproduces the application's argument grammar
//! (first database path, `-pw:` passphrase flag, optional debug and
//! plugin-artifact flags).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::HarnessError;
use crate::timeouts::DEFAULT_STARTUP_TIMEOUT;

// ============================================================================
// SECTION: Passphrase
// ============================================================================

/// Passphrase shared by every fixture database.
pub const FIXTURE_PASSPHRASE: &str = "test";

/// Passphrase used to unlock a vault database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Passphrase(String);

impl Passphrase {
    /// Creates a passphrase from an arbitrary string.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the passphrase shared by the fixture databases.
    #[must_use]
    pub fn fixture() -> Self {
        Self(FIXTURE_PASSPHRASE.to_string())
    }

    /// Returns the passphrase as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the command-line form of the passphrase (`-pw:<secret>`).
    #[must_use]
    pub fn to_arg(&self) -> String {
        format!("-pw:{}", self.0)
    }
}

impl fmt::Display for Passphrase {
    // Never echo the secret into logs or error chains.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<passphrase>")
    }
}

// ============================================================================
// SECTION: Database Count
// ============================================================================

/// Validated number of fixture databases to write and open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseCount(u32);

impl DatabaseCount {
    /// Creates a database count from a known-valid value.
    #[must_use]
    pub const fn new(count: u32) -> Self {
        Self(count)
    }

    /// Creates a database count from a raw (possibly negative) value.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::DatabaseCountOutOfRange`] when `raw` is
    /// negative or exceeds `u32::MAX`.
    pub fn from_raw(raw: i64) -> Result<Self, HarnessError> {
        u32::try_from(raw)
            .map(Self)
            .map_err(|_| HarnessError::DatabaseCountOutOfRange { requested: raw, minimum: 0 })
    }

    /// Returns the validated count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Ensures the count meets the minimum a launch variant requires.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::DatabaseCountOutOfRange`] when the count is
    /// below `minimum`.
    pub const fn require_at_least(self, minimum: u32) -> Result<(), HarnessError> {
        if self.0 < minimum {
            return Err(HarnessError::DatabaseCountOutOfRange {
                requested: self.0 as i64,
                minimum,
            });
        }
        Ok(())
    }

    /// Returns 1-based fixture indices for this count.
    pub fn indices(self) -> impl Iterator<Item = u32> {
        1..=self.0
    }
}

impl Default for DatabaseCount {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for DatabaseCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Launch Options
// ============================================================================

/// Parameters for a single launch of the vault application.
///
/// Defaults mirror the historical harness behavior: exit existing instances
/// first, overwrite the configuration blob, open one database, no debug
/// output, two-second deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Exit previously launched instances before starting a new one.
    pub exit_all_first: bool,
    /// Overwrite the configuration blob with the canned startup defaults.
    pub fresh_config: bool,
    /// Number of fixture databases to write and open.
    pub databases: DatabaseCount,
    /// Pass the `--debug` flag to the application.
    pub debug: bool,
    /// Pass the `--save-plugin-artifacts` flag to the application.
    pub save_plugin_artifacts: bool,
    /// Passphrase for every fixture database.
    pub passphrase: Passphrase,
    /// Deadline applied to readiness, drain, and shutdown waits.
    pub timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            exit_all_first: true,
            fresh_config: true,
            databases: DatabaseCount::default(),
            debug: false,
            save_plugin_artifacts: false,
            passphrase: Passphrase::fixture(),
            timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }
}

impl LaunchOptions {
    /// Sets the number of fixture databases.
    #[must_use]
    pub const fn with_databases(mut self, databases: DatabaseCount) -> Self {
        self.databases = databases;
        self
    }

    /// Enables or disables the pre-launch exit-all drain.
    #[must_use]
    pub const fn with_exit_all_first(mut self, exit_all_first: bool) -> Self {
        self.exit_all_first = exit_all_first;
        self
    }

    /// Enables or disables overwriting the configuration blob.
    #[must_use]
    pub const fn with_fresh_config(mut self, fresh_config: bool) -> Self {
        self.fresh_config = fresh_config;
        self
    }

    /// Enables or disables the `--debug` flag.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Overrides the wait deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the application argument list.
    ///
    /// The first database and the passphrase flag are present only when at
    /// least one database was requested; `first_database` must be `Some` in
    /// that case and is ignored otherwise.
    #[must_use]
    pub fn to_args(&self, first_database: Option<&Path>) -> Vec<String> {
        let mut args = Vec::new();
        if self.databases.get() > 0
            && let Some(path) = first_database
        {
            args.push(path.display().to_string());
            args.push(self.passphrase.to_arg());
        }
        if self.debug {
            args.push("--debug".to_string());
        }
        if self.save_plugin_artifacts {
            args.push("--save-plugin-artifacts".to_string());
        }
        args
    }
}

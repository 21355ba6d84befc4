// crates/vault-harness-core/src/config.rs
// ============================================================================
// Module: Application Configuration Blob
// Description: Typed model of the vault application's configuration file.
// Purpose: Produce the canned startup configuration written before each
//          launch and parse it back in the stub application and tests.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! The vault application reads a TOML configuration file from its working
//! directory at startup. The harness overwrites that file before each launch
//! to force a known state: defaults reset and the plugin subsystem disabled
//! so no plugin loads during startup. The launcher re-enables the plugin
//! policy over the control channel once the application is ready.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::errors::HarnessError;

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Startup behavior toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Check for application updates on launch.
    pub check_updates: bool,
    /// Show the first-run welcome screen.
    pub show_welcome: bool,
}

/// Plugin subsystem policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginPolicy {
    /// Master switch for the plugin subsystem.
    pub enabled: bool,
    /// Load plugins found in the plugin directory during startup.
    pub auto_load: bool,
}

/// Window and tray behavior toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Minimize to the notification tray instead of the taskbar.
    pub minimize_to_tray: bool,
    /// Restore the previous window layout on launch.
    pub remember_window_layout: bool,
}

/// The vault application's configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Startup behavior.
    pub startup: StartupConfig,
    /// Plugin subsystem policy.
    pub plugins: PluginPolicy,
    /// Window and tray behavior.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Returns the canned configuration written before each launch: defaults
    /// reset and plugins disabled so none load automatically.
    #[must_use]
    pub const fn startup_default() -> Self {
        Self {
            startup: StartupConfig { check_updates: false, show_welcome: false },
            plugins: PluginPolicy { enabled: false, auto_load: false },
            ui: UiConfig { minimize_to_tray: false, remember_window_layout: false },
        }
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when serialization fails.
    pub fn to_toml_string(&self) -> Result<String, HarnessError> {
        toml::to_string_pretty(self).map_err(|err| HarnessError::Config(err.to_string()))
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when the text is not a valid
    /// configuration document.
    pub fn from_toml_str(raw: &str) -> Result<Self, HarnessError> {
        toml::from_str(raw).map_err(|err| HarnessError::Config(err.to_string()))
    }
}

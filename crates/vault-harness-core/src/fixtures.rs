// crates/vault-harness-core/src/fixtures.rs
// ============================================================================
// Module: Launch Fixtures
// Description: Canned configuration and template database fixture writers.
// Purpose: Force a known application state before every launch.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Before each launch the harness overwrites the application's configuration
//! blob and writes N copies of a pre-built template database into the working
//! directory under the fixed `test{n}.vaultdb` naming template. The files are
//! ephemeral; nothing cleans them up beyond the working directory's own
//! lifetime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::errors::HarnessError;
use crate::options::DatabaseCount;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name of the vault application's configuration blob.
pub const CONFIG_FILE_NAME: &str = "vaultapp.config.toml";

/// Base name of the vault application executable (no platform suffix).
pub const EXECUTABLE_BASE_NAME: &str = "vaultapp";

/// Pre-built template database unlocked by the fixture passphrase.
pub const TEMPLATE_DATABASE: &[u8] = include_bytes!("../fixtures/test.vaultdb");

// ============================================================================
// SECTION: Naming
// ============================================================================

/// Returns the fixture database file name for a 1-based index.
#[must_use]
pub fn database_file_name(index: u32) -> String {
    format!("test{index}.vaultdb")
}

/// Returns the platform executable name of the vault application.
#[must_use]
pub fn executable_name() -> String {
    format!("{EXECUTABLE_BASE_NAME}{}", std::env::consts::EXE_SUFFIX)
}

// ============================================================================
// SECTION: Writers
// ============================================================================

/// Overwrites the configuration blob in `dir` with the canned startup
/// defaults (plugins disabled).
///
/// # Errors
///
/// Returns [`HarnessError::Fixture`] when the file cannot be written and
/// [`HarnessError::Config`] when serialization fails.
pub fn write_config(dir: &Path) -> Result<PathBuf, HarnessError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let blob = AppConfig::startup_default().to_toml_string()?;
    fs::write(&path, blob).map_err(|source| HarnessError::Fixture { path: path.clone(), source })?;
    Ok(path)
}

/// Writes `count` copies of the template database into `dir` as
/// `test1.vaultdb` .. `test{count}.vaultdb`, in index order.
///
/// # Errors
///
/// Returns [`HarnessError::Fixture`] on the first file that cannot be
/// written; earlier files are left in place.
pub fn write_databases(dir: &Path, count: DatabaseCount) -> Result<Vec<PathBuf>, HarnessError> {
    let mut files = Vec::new();
    for index in count.indices() {
        let path = dir.join(database_file_name(index));
        fs::write(&path, TEMPLATE_DATABASE)
            .map_err(|source| HarnessError::Fixture { path: path.clone(), source })?;
        files.push(path);
    }
    Ok(files)
}

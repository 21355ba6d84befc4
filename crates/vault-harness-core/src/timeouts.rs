// crates/vault-harness-core/src/timeouts.rs
// ============================================================================
// Module: Harness Timeouts
// Description: Centralized deadline configuration with env overrides.
// Purpose: Keep harness deadlines consistent and configurable across callers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! All bounded waits in the harness poll at a fixed cadence under a
//! wall-clock deadline. `VAULT_HARNESS_TIMEOUT_SEC` can raise a deadline for
//! slow machines; it acts as a minimum so explicitly longer deadlines are
//! never shortened.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::time::Duration;

use crate::errors::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable that raises every deadline (positive integer seconds).
pub const ENV_TIMEOUT_SECS: &str = "VAULT_HARNESS_TIMEOUT_SEC";

/// Cadence of the bounded polling loops.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Default deadline for readiness, drain, and shutdown waits.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Returns the effective deadline, honoring `VAULT_HARNESS_TIMEOUT_SEC` when
/// set. The override acts as a minimum to avoid shortening explicitly longer
/// deadlines.
///
/// # Errors
///
/// Returns [`HarnessError::Environment`] when the environment value is
/// present but is not a positive integer number of seconds.
pub fn resolve_timeout(requested: Duration) -> Result<Duration, HarnessError> {
    match env::var(ENV_TIMEOUT_SECS) {
        Ok(raw) => {
            let override_timeout = parse_timeout_secs(&raw)
                .map_err(|err| HarnessError::Environment(format!("{ENV_TIMEOUT_SECS} {err}")))?;
            Ok(std::cmp::max(requested, override_timeout))
        }
        Err(_) => Ok(requested),
    }
}

/// Parses a positive integer number of seconds.
fn parse_timeout_secs(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("must be a positive integer number of seconds".to_string());
    }
    let secs: u64 =
        trimmed.parse().map_err(|_| "must be a positive integer number of seconds".to_string())?;
    if secs == 0 {
        return Err("must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(secs))
}

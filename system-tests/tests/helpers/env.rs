// system-tests/tests/helpers/env.rs
// ============================================================================
// Module: Test Environment Helpers
// Description: Wrappers for test-only process-global mutation.
// Purpose: Centralize env var changes and registry serialization.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The stub application reads its misbehavior knobs from the environment,
//! and the exit-all drain works against a process-wide registry. Suites that
//! touch either hold [`process_lock`] for the whole test.

#![allow(unsafe_code, reason = "Test harness mutates process env for stub configuration.")]

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

/// Serializes tests that mutate the environment or drain the registry.
pub fn process_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sets an environment variable for the current process.
pub fn set_var(key: &str, value: &str) {
    // SAFETY: Callers hold `process_lock`, and the suites spawn children only
    // from the locked test.
    unsafe {
        std::env::set_var(key, value);
    }
}

/// Removes an environment variable from the current process.
pub fn remove_var(key: &str) {
    // SAFETY: Callers hold `process_lock`; see `set_var`.
    unsafe {
        std::env::remove_var(key);
    }
}

// system-tests/src/lib.rs
// ============================================================================
// Module: Vault Harness System Tests Library
// Description: Stub application logic shared by the system-test binary.
// Purpose: Keep the stub vault application's session logic unit-testable
//          outside the spawned process.
// Dependencies: serde_json, vault-harness-core
// ============================================================================

//! ## Overview
//! This crate hosts the stand-in vault application used by the end-to-end
//! suites in `system-tests/tests`. The binary in `src/bin` wires the session
//! logic here to real stdio.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod stub;

// ============================================================================
// SECTION: Tests
// ============================================================================

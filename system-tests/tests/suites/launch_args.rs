// system-tests/tests/suites/launch_args.rs
// ============================================================================
// Module: Launch Argument Tests
// Description: End-to-end coverage of database counts and argument flags.
// Purpose: Validate the variant-specific database-count floors and the
//          passthrough flags against the stub application.
// Dependencies: system-tests helpers, vault-harness-core, vault-harness-launcher
// ============================================================================

//! ## Overview
//! The shared variant refuses zero databases before any process work; the
//! isolated variant accepts zero and then starts the application without a
//! database or passphrase argument. Passthrough flags must survive the trip
//! through the application's argument grammar.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use vault_harness_core::HarnessError;
use vault_harness_core::options::DatabaseCount;
use vault_harness_launcher::AppInstance;
use vault_harness_launcher::Launcher;

use crate::helpers::harness;

#[tokio::test]
async fn shared_variant_requires_at_least_one_database() {
    let staged = harness::stage_app();
    let options = harness::suite_options().with_databases(DatabaseCount::new(0));
    let err = Launcher::new(&staged.exe).launch(&options).await.unwrap_err();
    assert!(matches!(
        err,
        HarnessError::DatabaseCountOutOfRange { requested: 0, minimum: 1 }
    ));
}

#[test]
fn negative_counts_fail_before_any_process_work() {
    let err = DatabaseCount::from_raw(-3).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::DatabaseCountOutOfRange { requested: -3, .. }
    ));
}

#[tokio::test]
async fn isolated_variant_accepts_zero_databases() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let options = harness::suite_options().with_databases(DatabaseCount::new(0));
    let app = instance.start(&options).await.expect("starts without a database");
    let state = app.state().await.expect("state query succeeds");
    assert!(state.open_databases.is_empty());
    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

#[tokio::test]
async fn passthrough_flags_survive_the_argument_grammar() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let mut options = harness::suite_options().with_debug(true);
    options.save_plugin_artifacts = true;
    // A launch succeeds only when the application accepted every flag.
    let app = instance.start(&options).await.expect("starts with passthrough flags");
    assert_eq!(app.databases().len(), 1);
    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

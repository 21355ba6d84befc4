// system-tests/tests/suites/isolation.rs
// ============================================================================
// Module: Isolated Instance Tests
// Description: End-to-end coverage of the isolated launch variant.
// Purpose: Validate private working directories, independent state, the
//          single-start rule, and restartability after a failed start.
// Dependencies: system-tests helpers, vault-harness-core, vault-harness-launcher
// ============================================================================

//! ## Overview
//! Each isolated instance owns a scratch working directory and one OS
//! process; two instances must never observe each other's databases or
//! plugins, and a failed start must leave the instance reusable.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use vault_harness_core::HarnessError;
use vault_harness_core::Passphrase;
use vault_harness_core::fixtures;

use vault_harness_launcher::AppInstance;

use crate::helpers::harness;

#[tokio::test]
async fn instances_run_concurrently_in_private_directories() {
    let mut first = AppInstance::new(harness::stub_exe()).expect("first instance");
    let mut second = AppInstance::new(harness::stub_exe()).expect("second instance");
    assert_ne!(first.workdir(), second.workdir());

    let first_pid = first.start(&harness::suite_options()).await.expect("first starts").pid();
    let second_pid = second.start(&harness::suite_options()).await.expect("second starts").pid();
    assert_ne!(first_pid, second_pid);

    // Fixtures land in each instance's own directory.
    assert!(first.workdir().join(fixtures::database_file_name(1)).is_file());
    assert!(second.workdir().join(fixtures::database_file_name(1)).is_file());

    // A plugin loaded in one instance stays invisible to the other.
    let artifact_dir = tempfile::tempdir().expect("artifact directory");
    let artifact = harness::write_plugin_artifact(artifact_dir.path(), "solo");
    first.app().expect("first app").load_plugin(&artifact).await.expect("plugin loads");

    let second_state = second.app().expect("second app").state().await.expect("second state");
    assert!(second_state.loaded_plugins.is_empty());
    let first_state = first.app().expect("first app").state().await.expect("first state");
    assert_eq!(first_state.loaded_plugins, vec!["solo".to_string()]);

    first.shutdown(harness::SUITE_TIMEOUT).await.expect("first shutdown");
    second.shutdown(harness::SUITE_TIMEOUT).await.expect("second shutdown");
}

#[tokio::test]
async fn a_second_start_is_rejected_before_any_process_work() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    instance.start(&harness::suite_options()).await.expect("first start succeeds");

    let err = instance.start(&harness::suite_options()).await.unwrap_err();
    assert!(matches!(err, HarnessError::AlreadyStarted));

    // The running launch is untouched by the rejected start.
    let state = instance.app().expect("app handle").state().await.expect("state");
    assert_eq!(state.open_databases.len(), 1);

    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

#[tokio::test]
async fn a_failed_start_leaves_the_instance_restartable() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let mut bad = harness::suite_options();
    bad.passphrase = Passphrase::new("wrong-passphrase");

    let err = instance.start(&bad).await.unwrap_err();
    assert!(matches!(err, HarnessError::AppExited { .. }));
    assert!(!instance.is_started());

    instance.start(&harness::suite_options()).await.expect("instance is restartable");
    assert!(instance.is_started());
    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

#[tokio::test]
async fn a_dead_application_surfaces_as_a_closed_channel() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let app = instance.start(&harness::suite_options()).await.expect("starts");

    app.kill().await.expect("kill succeeds");
    // The next request hits either a broken stdin pipe or an stdout EOF;
    // both report the application as gone, never as a bare I/O failure.
    let err = app.state().await.unwrap_err();
    assert!(matches!(err, HarnessError::ChannelClosed));
}

#[tokio::test]
async fn the_scratch_directory_is_removed_on_drop() {
    let instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let workdir = instance.workdir().to_path_buf();
    assert!(workdir.is_dir());
    drop(instance);
    assert!(!workdir.exists());
}

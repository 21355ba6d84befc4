// system-tests/tests/suites/exit_all.rs
// ============================================================================
// Module: Exit-All and Deadline Tests
// Description: End-to-end coverage of the exit-all drain and wait deadlines.
// Purpose: Validate the drain guarantee, the stuck-instance report, and the
//          startup deadline against misbehaving stub instances.
// Dependencies: system-tests helpers, vault-harness-core, vault-harness-launcher
// ============================================================================

//! ## Overview
//! These tests work against the process-wide instance registry and the stub's
//! environment knobs, so every test holds the process lock for its full
//! duration and cleans up the instances it started.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::time::Duration;

use system_tests::stub;
use vault_harness_core::HarnessError;
use vault_harness_launcher::AppInstance;
use vault_harness_launcher::InstanceRegistry;

use crate::helpers::env;
use crate::helpers::harness;

#[tokio::test]
async fn exit_all_drains_every_running_instance() {
    let _guard = env::process_lock();
    let mut first = AppInstance::new(harness::stub_exe()).expect("first instance");
    let mut second = AppInstance::new(harness::stub_exe()).expect("second instance");
    let first_pid = first.start(&harness::suite_options()).await.expect("first starts").pid();
    let second_pid = second.start(&harness::suite_options()).await.expect("second starts").pid();

    let registry = InstanceRegistry::global();
    let live = registry.live_pids().await;
    assert!(live.contains(&first_pid));
    assert!(live.contains(&second_pid));

    registry.exit_all(harness::SUITE_TIMEOUT).await.expect("drain completes");
    assert!(registry.live_pids().await.is_empty());
}

#[tokio::test]
async fn launch_with_exit_all_first_drains_previous_instances() {
    let _guard = env::process_lock();
    let mut stale = AppInstance::new(harness::stub_exe()).expect("stale instance");
    let stale_pid = stale.start(&harness::suite_options()).await.expect("stale starts").pid();

    let mut fresh = AppInstance::new(harness::stub_exe()).expect("fresh instance");
    let options = harness::suite_options().with_exit_all_first(true);
    let fresh_pid = fresh.start(&options).await.expect("fresh starts").pid();

    let live = InstanceRegistry::global().live_pids().await;
    assert!(live.contains(&fresh_pid));
    assert!(!live.contains(&stale_pid));

    fresh.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

#[tokio::test]
async fn stuck_instance_is_reported_with_its_pid() {
    let _guard = env::process_lock();
    env::set_var(stub::ENV_IGNORE_EXIT, "1");
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let started = instance.start(&harness::suite_options()).await;
    env::remove_var(stub::ENV_IGNORE_EXIT);
    let pid = started.expect("stuck instance starts").pid();

    let err =
        InstanceRegistry::global().exit_all(Duration::from_millis(600)).await.unwrap_err();
    match err {
        HarnessError::ExitAllTimeout { remaining, .. } => assert_eq!(remaining, vec![pid]),
        other => panic!("unexpected error: {other}"),
    }

    instance.app().expect("app handle").kill().await.expect("kill succeeds");
    assert!(InstanceRegistry::global().live_pids().await.is_empty());
}

#[tokio::test]
async fn shutdown_kills_an_instance_that_ignores_exit() {
    let _guard = env::process_lock();
    env::set_var(stub::ENV_IGNORE_EXIT, "1");
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let started = instance.start(&harness::suite_options()).await;
    env::remove_var(stub::ENV_IGNORE_EXIT);
    let pid = started.expect("stuck instance starts").pid();

    // The clean exit times out, so the teardown falls back to a kill.
    instance
        .shutdown(Duration::from_millis(600))
        .await
        .expect("kill fallback reclaims the instance");
    assert!(!InstanceRegistry::global().live_pids().await.contains(&pid));
}

#[tokio::test]
async fn slow_responses_hit_the_command_deadline() {
    let _guard = env::process_lock();
    env::set_var(stub::ENV_RESPONSE_DELAY_MS, "2000");
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let options = harness::suite_options().with_timeout(Duration::from_millis(500));
    // The launch sequence issues control requests after readiness, so a slow
    // responder trips the per-request deadline.
    let result = instance.start(&options).await;
    env::remove_var(stub::ENV_RESPONSE_DELAY_MS);

    let err = result.unwrap_err();
    assert!(err.is_timeout());
    assert!(matches!(err, HarnessError::CommandTimeout { .. }));
    assert!(!instance.is_started());
}

#[tokio::test]
async fn slow_startup_hits_the_deadline_and_leaves_the_instance_restartable() {
    let _guard = env::process_lock();
    env::set_var(stub::ENV_STARTUP_DELAY_MS, "2000");
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let options = harness::suite_options().with_timeout(Duration::from_millis(500));
    let result = instance.start(&options).await;
    env::remove_var(stub::ENV_STARTUP_DELAY_MS);

    let err = result.unwrap_err();
    assert!(err.is_timeout());
    assert!(matches!(err, HarnessError::StartupTimeout { .. }));
    assert!(!instance.is_started());

    instance.start(&harness::suite_options()).await.expect("instance is restartable");
    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

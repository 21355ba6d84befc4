// system-tests/tests/suites/plugin_load.rs
// ============================================================================
// Module: Plugin Load Tests
// Description: End-to-end coverage of plugin loads and the build mode.
// Purpose: Validate that artifacts pass through untouched and that the
//          application's loader verdicts are relayed verbatim.
// Dependencies: system-tests helpers, vault-harness-core, vault-harness-launcher
// ============================================================================

//! ## Overview
//! The harness never validates plugin artifacts locally: whatever the
//! application's loader decides is what the caller sees. The build mode is
//! equally a passthrough; a failed build surfaces the exit status.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::path::Path;
use std::path::PathBuf;

use vault_harness_core::HarnessError;
use vault_harness_launcher::AppInstance;
use vault_harness_launcher::PluginBuildOptions;
use vault_harness_launcher::build_plugin_artifact;

use crate::helpers::harness;

#[tokio::test]
async fn a_plugin_artifact_loads_through_the_application() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let app = instance.start(&harness::suite_options()).await.expect("starts");

    let artifact_dir = tempfile::tempdir().expect("artifact directory");
    let artifact = harness::write_plugin_artifact(artifact_dir.path(), "sample");
    let state = app.load_plugin(&artifact).await.expect("plugin loads");
    assert_eq!(state.loaded_plugins, vec!["sample".to_string()]);

    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

#[tokio::test]
async fn loader_rejections_are_relayed_verbatim() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let app = instance.start(&harness::suite_options()).await.expect("starts");

    let artifact_dir = tempfile::tempdir().expect("artifact directory");
    let unsupported = artifact_dir.path().join("sample.tar");
    std::fs::write(&unsupported, b"not a plugin").expect("artifact written");

    let err = app.load_plugin(&unsupported).await.unwrap_err();
    match err {
        HarnessError::CommandFailed(message) => {
            assert!(message.contains("unsupported plugin artifact"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = app.load_plugin(Path::new("/nonexistent/sample.vplugin")).await.unwrap_err();
    match err {
        HarnessError::CommandFailed(message) => assert!(message.contains("not found")),
        other => panic!("unexpected error: {other}"),
    }

    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

#[tokio::test]
async fn a_disabled_policy_blocks_loads_until_reenabled() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let app = instance.start(&harness::suite_options()).await.expect("starts");

    let artifact_dir = tempfile::tempdir().expect("artifact directory");
    let artifact = harness::write_plugin_artifact(artifact_dir.path(), "gated");

    app.set_plugin_policy(false).await.expect("policy disabled");
    let err = app.load_plugin(&artifact).await.unwrap_err();
    match err {
        HarnessError::CommandFailed(message) => assert!(message.contains("policy is disabled")),
        other => panic!("unexpected error: {other}"),
    }

    app.set_plugin_policy(true).await.expect("policy re-enabled");
    let state = app.load_plugin(&artifact).await.expect("load succeeds after re-enable");
    assert_eq!(state.loaded_plugins, vec!["gated".to_string()]);

    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

#[tokio::test]
async fn build_mode_failures_surface_the_exit_status() {
    let options = PluginBuildOptions {
        project_path: Some(PathBuf::from("plugin-project")),
        ..PluginBuildOptions::default()
    };
    // The stub has no build mode, so the invocation exits non-zero.
    let err = build_plugin_artifact(&harness::stub_exe(), &options).await.unwrap_err();
    assert!(matches!(err, HarnessError::CommandFailed(_)));
}

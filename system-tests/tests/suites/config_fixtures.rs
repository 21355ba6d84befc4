// system-tests/tests/suites/config_fixtures.rs
// ============================================================================
// Module: Configuration and Fixture Tests
// Description: End-to-end coverage of the pre-launch fixture staging.
// Purpose: Validate the fresh-config overwrite, the stale-blob escape hatch,
//          and the fixture database naming template.
// Dependencies: system-tests helpers, vault-harness-core, vault-harness-launcher
// ============================================================================

//! ## Overview
//! Before each launch the harness overwrites the configuration blob and
//! writes the fixture databases into the working directory. These tests pin
//! the overwrite semantics and the `test{n}.vaultdb` naming template against
//! a running application.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use vault_harness_core::AppConfig;
use vault_harness_core::HarnessError;
use vault_harness_core::fixtures;
use vault_harness_core::fixtures::CONFIG_FILE_NAME;
use vault_harness_core::options::DatabaseCount;
use vault_harness_launcher::AppInstance;

use crate::helpers::harness;

#[tokio::test]
async fn a_fresh_launch_overwrites_a_stale_configuration_blob() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    std::fs::write(instance.workdir().join(CONFIG_FILE_NAME), "not a configuration")
        .expect("stale blob written");

    instance.start(&harness::suite_options()).await.expect("launch overwrites the blob");

    let raw = std::fs::read_to_string(instance.workdir().join(CONFIG_FILE_NAME))
        .expect("configuration blob exists");
    let config = AppConfig::from_toml_str(&raw).expect("canned blob parses");
    assert_eq!(config, AppConfig::startup_default());

    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

#[tokio::test]
async fn a_stale_blob_is_honored_when_fresh_config_is_off() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    std::fs::write(instance.workdir().join(CONFIG_FILE_NAME), "not a configuration")
        .expect("stale blob written");

    let options = harness::suite_options().with_fresh_config(false);
    let err = instance.start(&options).await.unwrap_err();
    // The application read the stale blob and refused to start.
    assert!(matches!(err, HarnessError::AppExited { status: Some(2) }));
}

#[tokio::test]
async fn fixture_databases_follow_the_naming_template() {
    let mut instance = AppInstance::new(harness::stub_exe()).expect("instance");
    let options = harness::suite_options().with_databases(DatabaseCount::new(2));
    let databases = instance.start(&options).await.expect("starts").databases().to_vec();

    assert_eq!(
        databases,
        vec![
            instance.workdir().join(fixtures::database_file_name(1)),
            instance.workdir().join(fixtures::database_file_name(2)),
        ]
    );
    for path in &databases {
        let raw = std::fs::read(path).expect("fixture contents");
        assert_eq!(raw, fixtures::TEMPLATE_DATABASE);
    }

    instance.shutdown(harness::SUITE_TIMEOUT).await.expect("shutdown");
}

// crates/vault-harness-cli/src/main.rs
// ============================================================================
// Module: Vault Harness CLI Entry Point
// Description: Operator command dispatcher for manual harness runs.
// Purpose: Launch the vault application with fixtures from a terminal and
//          drive the plugin-artifact build mode.
// Dependencies: clap, tokio, tracing-subscriber, vault-harness-core,
//               vault-harness-launcher
// ============================================================================

//! ## Overview
//! `vault-harness launch` stages fixtures, starts the application, optionally
//! loads a plugin artifact, and keeps the instance alive until Ctrl-C before
//! exiting it cleanly. `vault-harness build-plugin` wraps the application's
//! plugin-artifact build mode. Failures map to exit code 1 with the
//! structured error on stderr; retry policy stays with the operator.

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use tracing::info;
use vault_harness_core::DatabaseCount;
use vault_harness_core::HarnessError;
use vault_harness_core::LaunchOptions;
use vault_harness_launcher::Launcher;
use vault_harness_launcher::PluginBuildOptions;
use vault_harness_launcher::build_plugin_artifact;

// ============================================================================
// SECTION: Argument Types
// ============================================================================

/// Test harness for the vault application and its plugin loader.
#[derive(Debug, Parser)]
#[command(name = "vault-harness", version, about)]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: CliCommand,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Launch the vault application with staged fixtures.
    Launch(LaunchArgs),
    /// Build a plugin artifact through the application's build mode.
    BuildPlugin(BuildPluginArgs),
}

/// Arguments for `vault-harness launch`.
#[derive(Debug, clap::Args)]
struct LaunchArgs {
    /// Path to the vault application executable.
    #[arg(long)]
    exe: PathBuf,
    /// Number of fixture databases to write and open.
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    databases: i64,
    /// Keep the existing configuration blob instead of overwriting it.
    #[arg(long)]
    no_fresh_config: bool,
    /// Skip the pre-launch drain of previously launched instances.
    #[arg(long)]
    no_exit_all: bool,
    /// Pass the application's debug flag.
    #[arg(long)]
    debug: bool,
    /// Deadline in seconds for readiness, drain, and shutdown waits.
    #[arg(long, default_value_t = 2)]
    timeout_secs: u64,
    /// Plugin artifact to load once the application is ready.
    #[arg(long)]
    plugin: Option<PathBuf>,
}

/// Arguments for `vault-harness build-plugin`.
#[derive(Debug, clap::Args)]
struct BuildPluginArgs {
    /// Path to the vault application executable.
    #[arg(long)]
    exe: PathBuf,
    /// Plugin project directory to package.
    #[arg(long)]
    project: Option<PathBuf>,
    /// Minimum application version the artifact requires.
    #[arg(long)]
    app_version: Option<String>,
    /// Minimum runtime version the artifact requires.
    #[arg(long)]
    runtime_version: Option<String>,
    /// Operating system the artifact requires.
    #[arg(long)]
    os: Option<String>,
    /// Pointer width the artifact requires.
    #[arg(long)]
    pointer_size: Option<String>,
    /// Command to run before the build.
    #[arg(long)]
    pre_build: Option<String>,
    /// Command to run after the build.
    #[arg(long)]
    post_build: Option<String>,
}

// ============================================================================
// SECTION: Option Mapping
// ============================================================================

/// Maps CLI flags onto validated launch options.
fn launch_options(args: &LaunchArgs) -> Result<LaunchOptions, HarnessError> {
    let databases = DatabaseCount::from_raw(args.databases)?;
    Ok(LaunchOptions {
        exit_all_first: !args.no_exit_all,
        fresh_config: !args.no_fresh_config,
        databases,
        debug: args.debug,
        timeout: Duration::from_secs(args.timeout_secs),
        ..LaunchOptions::default()
    })
}

/// Maps CLI flags onto plugin build options.
fn build_options(args: &BuildPluginArgs) -> PluginBuildOptions {
    PluginBuildOptions {
        project_path: args.project.clone(),
        app_version: args.app_version.clone(),
        runtime_version: args.runtime_version.clone(),
        os: args.os.clone(),
        pointer_size: args.pointer_size.clone(),
        pre_build: args.pre_build.clone(),
        post_build: args.post_build.clone(),
    }
}

// ============================================================================
// SECTION: Command Handlers
// ============================================================================

/// Runs `launch`: bring the application up, optionally load a plugin, hold
/// until Ctrl-C, then exit the instance cleanly.
async fn run_launch(args: &LaunchArgs) -> Result<(), HarnessError> {
    let options = launch_options(args)?;
    let launcher = Launcher::new(&args.exe);
    let app = launcher.launch(&options).await?;
    info!(pid = app.pid(), version = app.version(), "vault application launched");

    if let Some(artifact) = &args.plugin {
        app.load_plugin(artifact).await?;
    }

    info!("press Ctrl-C to exit the instance");
    tokio::signal::ctrl_c().await?;
    match app.exit(options.timeout).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_timeout() => {
            app.kill().await?;
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// Runs `build-plugin`.
async fn run_build_plugin(args: &BuildPluginArgs) -> Result<(), HarnessError> {
    build_plugin_artifact(&args.exe, &build_options(args)).await
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Dispatches the parsed command.
async fn run(cli: Cli) -> Result<(), HarnessError> {
    match cli.command {
        CliCommand::Launch(args) => run_launch(&args).await,
        CliCommand::BuildPlugin(args) => run_build_plugin(&args).await,
    }
}

/// Reports a terminal failure on stderr.
#[allow(clippy::print_stderr, reason = "The CLI reports terminal failures on stderr.")]
fn report_failure(err: &HarnessError) {
    eprintln!("vault-harness: {err}");
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

// system-tests/src/bin/stub_vault_app.rs
// ============================================================================
// Module: Stub Vault Application Binary
// Description: Stand-in for the external vault application.
// Purpose: Give the end-to-end suites a real child process that speaks the
//          control protocol over stdio.
// Dependencies: system-tests, vault-harness-core
// ============================================================================

//! ## Overview
//! Wires the stub session logic to real stdio: parse the startup argument
//! grammar, honor the configuration blob in the working directory, open the
//! startup database, emit `ready`, then serve control requests line by line
//! until `exit`. Env knobs simulate a slow start, slow responses, and a
//! stuck instance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use system_tests::stub;
use system_tests::stub::Session;
use vault_harness_core::AppConfig;
use vault_harness_core::control::ControlEvent;
use vault_harness_core::control::ControlRequest;
use vault_harness_core::fixtures::CONFIG_FILE_NAME;

// ============================================================================
// SECTION: Stdio Plumbing
// ============================================================================

/// Writes one event line and flushes so the harness sees it immediately.
fn emit(out: &mut impl Write, event: &ControlEvent) -> std::io::Result<()> {
    let line = event.to_line().map_err(std::io::Error::other)?;
    writeln!(out, "{line}")?;
    out.flush()
}

/// Reports a fatal startup problem on stderr.
fn report(message: &str) {
    // The stub mirrors the real application: startup failures go to stderr
    // before any readiness signal.
    let mut err = std::io::stderr();
    let _ = writeln!(err, "stub-vault-app: {message}");
    let _ = err.flush();
}

// ============================================================================
// SECTION: Startup
// ============================================================================

/// Reads an optional millisecond delay knob from the environment.
fn env_delay(key: &str) -> Option<Duration> {
    let raw = std::env::var(key).ok()?;
    raw.trim().parse().ok().map(Duration::from_millis)
}

/// Loads the configuration blob from the working directory, when present.
fn load_config() -> Result<Option<AppConfig>, String> {
    match std::fs::read_to_string(CONFIG_FILE_NAME) {
        Ok(raw) => AppConfig::from_toml_str(&raw)
            .map(Some)
            .map_err(|err| format!("invalid configuration blob: {err}")),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(format!("cannot read configuration blob: {err}")),
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match stub::parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            report(&message);
            return ExitCode::from(2);
        }
    };

    let config = match load_config() {
        Ok(config) => config,
        Err(message) => {
            report(&message);
            return ExitCode::from(2);
        }
    };

    let ignore_exit = std::env::var_os(stub::ENV_IGNORE_EXIT).is_some();
    let mut session = Session::new(config.as_ref(), ignore_exit);

    if let Some(database) = &options.database {
        let Some(passphrase) = &options.passphrase else {
            report("a startup database requires the -pw: flag");
            return ExitCode::from(2);
        };
        if let Err(message) = session.open_database(database, passphrase) {
            report(&message);
            return ExitCode::FAILURE;
        }
    }

    if let Some(delay) = env_delay(stub::ENV_STARTUP_DELAY_MS) {
        std::thread::sleep(delay);
    }
    let response_delay = env_delay(stub::ENV_RESPONSE_DELAY_MS);

    let mut out = std::io::stdout();
    let ready =
        ControlEvent::Ready { pid: std::process::id(), version: stub::STUB_VERSION.to_string() };
    if emit(&mut out, &ready).is_err() {
        return ExitCode::FAILURE;
    }

    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let request = match ControlRequest::from_line(&line) {
            Ok(request) => request,
            Err(err) => {
                report(&format!("dropping malformed request: {err}"));
                continue;
            }
        };
        if let Some(delay) = response_delay {
            std::thread::sleep(delay);
        }
        let handled = session.handle(request);
        for event in &handled.events {
            if emit(&mut out, event).is_err() {
                return ExitCode::FAILURE;
            }
        }
        if handled.exit {
            return ExitCode::SUCCESS;
        }
    }

    // Stdin closed without an exit request: the harness went away.
    ExitCode::SUCCESS
}

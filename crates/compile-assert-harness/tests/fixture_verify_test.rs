//! Integration test: fixture verification
//!
//! Validates that:
//! 1. The smoke fixture set loads and every fixture passes.
//! 2. A failing fixture reports the assertion message.
//! 3. Running with logging enabled does not change any outcome.
//! 4. The CLI exits non-zero when a fixture fails and writes a JSON report.
//! 5. Failing fixtures are reported once through the log, not by the panic hook.
//!
//! Run: cargo test -p compile-assert-harness --test fixture_verify_test

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use compile_assert_core::LoggingMode;
use compile_assert_core::filemanagers::{CallEventKind, MemorySink};
use compile_assert_harness::{FixtureReport, FixtureRunner, FixtureSet};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load(name: &str) -> FixtureSet {
    FixtureSet::from_file(&fixture_path(name)).expect("fixture file should load")
}

#[test]
fn smoke_fixtures_all_pass() {
    let outcomes = FixtureRunner::new(LoggingMode::Disabled)
        .run(&load("smoke.json"))
        .unwrap();
    assert_eq!(outcomes.len(), 3);
    for outcome in &outcomes {
        assert!(outcome.passed, "{}: {:?}", outcome.name, outcome.failure);
    }
    assert!(FixtureReport::from_outcomes("disabled", outcomes).all_passed());
}

#[test]
fn regression_fixture_reports_error_diagnostics() {
    let outcomes = FixtureRunner::new(LoggingMode::Disabled)
        .run(&load("regression.json"))
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].passed);
    assert_eq!(
        outcomes[0].failure.as_deref(),
        Some(
            "Expected a successful compilation, but it failed.\n\nDiagnostics:\n\n \
             - [ERROR] Foo.java:7 incompatible types"
        )
    );
}

#[test]
fn logging_does_not_change_outcomes() {
    let set = load("smoke.json");
    let plain = FixtureRunner::new(LoggingMode::Disabled).run(&set).unwrap();

    let sink = Arc::new(MemorySink::new());
    let logged = FixtureRunner::new(LoggingMode::StackTraces)
        .with_sink(sink.clone())
        .run(&set)
        .unwrap();
    assert_eq!(plain, logged);

    let events = sink.events();
    assert!(!events.is_empty());
    assert!(
        events
            .iter()
            .filter(|e| e.kind == CallEventKind::Entry)
            .all(|e| e.stack_trace.is_some())
    );
}

#[test]
fn cli_fails_on_regression_and_writes_report() {
    let report_path = std::env::temp_dir().join(format!(
        "compile-assert-harness-report-{}.json",
        std::process::id()
    ));
    let status = Command::new(env!("CARGO_BIN_EXE_compile-assert-harness"))
        .args(["--log-level", "warn", "verify", "--fixture"])
        .arg(fixture_path("regression.json"))
        .args(["--logging", "enabled", "--output"])
        .arg(&report_path)
        .status()
        .expect("harness binary should run");
    assert!(!status.success());

    let report: FixtureReport =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!((report.total, report.failed), (1, 1));
    assert_eq!(report.logging, "enabled");
    let _ = std::fs::remove_file(&report_path);
}

#[test]
fn cli_reports_failures_without_panic_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_compile-assert-harness"))
        .env("RUST_BACKTRACE", "1")
        .args(["--log-level", "warn", "verify", "--logging", "disabled", "--fixture"])
        .arg(fixture_path("regression.json"))
        .output()
        .expect("harness binary should run");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked at"), "{stderr}");
    assert!(!stderr.contains("stack backtrace"), "{stderr}");
    assert!(stderr.contains("fixture failed"), "{stderr}");
    assert!(stderr.contains("incompatible types"), "{stderr}");
}

#[test]
fn cli_passes_on_smoke_fixtures() {
    let output = Command::new(env!("CARGO_BIN_EXE_compile-assert-harness"))
        .args(["verify", "--logging", "disabled", "--fixture"])
        .arg(fixture_path("smoke.json"))
        .output()
        .expect("harness binary should run");
    assert!(output.status.success());

    let report: FixtureReport = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!((report.total, report.passed), (3, 3));
}

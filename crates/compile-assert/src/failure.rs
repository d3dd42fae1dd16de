//! How assertions report failure.

use std::fmt;

use compile_assert_core::Diagnostic;

use crate::repr::{DiagnosticListRepresentation, Representation};

/// Fail the current assertion.
#[track_caller]
pub(crate) fn fail(message: impl fmt::Display) -> ! {
    panic!("{message}")
}

/// Fail with `message`, followed by the diagnostics that explain it.
#[track_caller]
pub(crate) fn fail_with_diagnostics(diagnostics: &[&Diagnostic], message: &str) -> ! {
    if diagnostics.is_empty() {
        fail(message);
    }
    let rendered = DiagnosticListRepresentation.to_string_of(diagnostics);
    fail([message, "Diagnostics:", rendered.as_str()].join("\n\n"))
}

/// Unwrap a file-manager lookup made on behalf of an assertion.
#[track_caller]
pub(crate) fn expect_lookup<T, E: fmt::Display>(
    result: Result<T, E>,
    what: impl fmt::Display,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => fail(format_args!("Failed to look up {what}: {err}")),
    }
}

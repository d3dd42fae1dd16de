//! Assertions on the diagnostics a compilation reported.

use compile_assert_core::{Diagnostic, DiagnosticKind};

use crate::failure::{fail, fail_with_diagnostics};
use crate::repr::{DiagnosticListRepresentation, Representation};

/// Fluent assertions on an ordered list of diagnostics.
#[derive(Debug, Clone)]
pub struct DiagnosticListAssert<'a> {
    actual: Vec<&'a Diagnostic>,
}

impl<'a> DiagnosticListAssert<'a> {
    #[must_use]
    pub fn new(actual: Vec<&'a Diagnostic>) -> Self {
        Self { actual }
    }

    #[must_use]
    pub fn actual(&self) -> &[&'a Diagnostic] {
        &self.actual
    }

    fn of_kinds(&self, kinds: &[DiagnosticKind]) -> Vec<&'a Diagnostic> {
        self.actual
            .iter()
            .copied()
            .filter(|diagnostic| kinds.contains(&diagnostic.kind))
            .collect()
    }

    #[track_caller]
    fn has_none_of(self, kinds: &[DiagnosticKind], what: &str) -> Self {
        let found = self.of_kinds(kinds);
        if !found.is_empty() {
            fail_with_diagnostics(&found, &format!("Expected no {what}, but found {}.", found.len()));
        }
        self
    }

    /// # Panics
    ///
    /// If any error or warning was reported.
    #[track_caller]
    pub fn has_no_errors_or_warnings(self) -> Self {
        self.has_none_of(&DiagnosticKind::WARNINGS_AND_ERRORS, "errors or warnings")
    }

    /// # Panics
    ///
    /// If any error was reported.
    #[track_caller]
    pub fn has_no_errors(self) -> Self {
        self.has_none_of(&DiagnosticKind::ERRORS, "errors")
    }

    /// # Panics
    ///
    /// If any warning or mandatory warning was reported.
    #[track_caller]
    pub fn has_no_warnings(self) -> Self {
        self.has_none_of(&DiagnosticKind::WARNINGS, "warnings")
    }

    /// Narrow to diagnostics of the given kinds.
    #[must_use]
    pub fn filtering(&self, kinds: &[DiagnosticKind]) -> Self {
        Self::new(self.of_kinds(kinds))
    }

    #[must_use]
    pub fn errors(&self) -> Self {
        self.filtering(&DiagnosticKind::ERRORS)
    }

    /// Warnings and mandatory warnings.
    #[must_use]
    pub fn warnings(&self) -> Self {
        self.filtering(&DiagnosticKind::WARNINGS)
    }

    #[must_use]
    pub fn notes(&self) -> Self {
        self.filtering(&[DiagnosticKind::Note])
    }

    /// # Panics
    ///
    /// If the list does not hold exactly `expected` diagnostics.
    #[track_caller]
    pub fn has_count(self, expected: usize) -> Self {
        if self.actual.len() != expected {
            self.fail_describing(&format!(
                "Expected {expected} diagnostics, but found {}.",
                self.actual.len()
            ));
        }
        self
    }

    /// # Panics
    ///
    /// If the list holds any diagnostic.
    #[track_caller]
    pub fn is_empty(self) -> Self {
        if !self.actual.is_empty() {
            fail_with_diagnostics(&self.actual, "Expected no diagnostics.");
        }
        self
    }

    /// # Panics
    ///
    /// If the list is empty.
    #[track_caller]
    pub fn is_not_empty(self) -> Self {
        if self.actual.is_empty() {
            fail("Expected at least one diagnostic, but found none.");
        }
        self
    }

    /// # Panics
    ///
    /// If no diagnostic message contains `needle`.
    #[track_caller]
    pub fn any_message_contains(self, needle: &str) -> Self {
        if !self.actual.iter().any(|d| d.message.contains(needle)) {
            self.fail_describing(&format!(
                "Expected a diagnostic whose message contains {needle:?}."
            ));
        }
        self
    }

    /// # Panics
    ///
    /// If the list is empty.
    #[track_caller]
    pub fn first(&self) -> DiagnosticAssert<'a> {
        self.get(0)
    }

    /// # Panics
    ///
    /// If there is no diagnostic at `index`.
    #[track_caller]
    pub fn get(&self, index: usize) -> DiagnosticAssert<'a> {
        match self.actual.get(index) {
            Some(diagnostic) => DiagnosticAssert::new(diagnostic),
            None => self.fail_describing(&format!(
                "Expected a diagnostic at index {index}, but there are only {}.",
                self.actual.len()
            )),
        }
    }

    #[track_caller]
    fn fail_describing(&self, message: &str) -> ! {
        if self.actual.is_empty() {
            fail(format_args!("{message}\n\nNo diagnostics were reported."));
        }
        fail_with_diagnostics(&self.actual, message)
    }
}

/// Fluent assertions on one diagnostic.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticAssert<'a> {
    actual: &'a Diagnostic,
}

impl<'a> DiagnosticAssert<'a> {
    #[must_use]
    pub fn new(actual: &'a Diagnostic) -> Self {
        Self { actual }
    }

    #[must_use]
    pub fn actual(self) -> &'a Diagnostic {
        self.actual
    }

    #[track_caller]
    fn fail_describing(self, message: &str) -> ! {
        fail(format_args!(
            "{message}\n\nDiagnostic:\n\n{}",
            DiagnosticListRepresentation.to_string_of(&[self.actual][..])
        ))
    }

    /// # Panics
    ///
    /// If the diagnostic is of another kind.
    #[track_caller]
    pub fn is_kind(self, expected: DiagnosticKind) -> Self {
        if self.actual.kind != expected {
            self.fail_describing(&format!(
                "Expected diagnostic kind {expected}, but was {}.",
                self.actual.kind
            ));
        }
        self
    }

    #[track_caller]
    pub fn is_error(self) -> Self {
        self.is_kind(DiagnosticKind::Error)
    }

    /// # Panics
    ///
    /// If the message does not contain `needle`.
    #[track_caller]
    pub fn message_contains(self, needle: &str) -> Self {
        if !self.actual.message.contains(needle) {
            self.fail_describing(&format!("Expected the message to contain {needle:?}."));
        }
        self
    }

    /// # Panics
    ///
    /// If the diagnostic has no code or a different one.
    #[track_caller]
    pub fn has_code(self, expected: &str) -> Self {
        if self.actual.code.as_deref() != Some(expected) {
            self.fail_describing(&format!("Expected diagnostic code {expected:?}."));
        }
        self
    }

    /// # Panics
    ///
    /// If the diagnostic is not reported on `line`.
    #[track_caller]
    pub fn is_on_line(self, line: u64) -> Self {
        if self.actual.line != Some(line) {
            self.fail_describing(&format!("Expected the diagnostic on line {line}."));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    fn panic_message(f: impl FnOnce()) -> String {
        let payload = catch_unwind(AssertUnwindSafe(f)).unwrap_err();
        payload.downcast_ref::<String>().cloned().unwrap()
    }

    fn reported() -> Vec<Diagnostic> {
        vec![
            Diagnostic::note("processing Foo.java"),
            Diagnostic::warning("unchecked cast").with_code("compiler.warn.unchecked"),
            Diagnostic::new(DiagnosticKind::MandatoryWarning, "deprecated API"),
            Diagnostic::error("cannot find symbol").at("Foo.java", 12, Some(5)),
        ]
    }

    #[test]
    fn filtering_narrows_by_kind() {
        let diagnostics = reported();
        let list = DiagnosticListAssert::new(diagnostics.iter().collect());
        list.warnings().has_count(2);
        list.errors().has_count(1).first().is_error().is_on_line(12);
        list.notes().has_count(1).any_message_contains("Foo.java");
        list.filtering(&[DiagnosticKind::Other]).is_empty();
        list.has_count(4).is_not_empty();
    }

    #[test]
    fn has_no_warnings_reports_offenders() {
        let diagnostics = reported();
        let message = panic_message(|| {
            DiagnosticListAssert::new(diagnostics.iter().collect()).has_no_warnings();
        });
        assert!(message.starts_with("Expected no warnings, but found 2.\n\nDiagnostics:\n\n"));
        assert!(message.contains("[MANDATORY_WARNING] deprecated API"));
        assert!(!message.contains("cannot find symbol"));
    }

    #[test]
    fn has_no_errors_passes_on_warnings_only() {
        let diagnostics = [Diagnostic::warning("unchecked cast")];
        DiagnosticListAssert::new(diagnostics.iter().collect()).has_no_errors();
    }

    #[test]
    fn diagnostic_assert_checks_fields() {
        let diagnostics = reported();
        let list = DiagnosticListAssert::new(diagnostics.iter().collect());
        list.get(1)
            .is_kind(DiagnosticKind::Warning)
            .has_code("compiler.warn.unchecked")
            .message_contains("unchecked");

        let message = panic_message(|| {
            list.get(1).is_kind(DiagnosticKind::Error);
        });
        assert_eq!(
            message,
            "Expected diagnostic kind ERROR, but was WARNING.\n\nDiagnostic:\n\n \
             - [WARNING] compiler.warn.unchecked: unchecked cast"
        );
    }

    #[test]
    fn get_out_of_range_fails() {
        let message = panic_message(|| {
            DiagnosticListAssert::new(Vec::new()).first();
        });
        assert_eq!(
            message,
            "Expected a diagnostic at index 0, but there are only 0.\n\nNo diagnostics were reported."
        );
    }
}

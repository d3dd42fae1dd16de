//! Assertions on a whole [`Compilation`].

use compile_assert_core::{Compilation, Diagnostic, DiagnosticKind, Location, StandardLocation};

use crate::diagnostics::DiagnosticListAssert;
use crate::failure::{expect_lookup, fail, fail_with_diagnostics};
use crate::groups::{ModuleContainerGroupAssert, OutputContainerGroupAssert, PackageContainerGroupAssert};
use crate::repr::{LocationRepresentation, Representation};

/// Fluent assertions on the outcome of a compilation.
#[derive(Debug, Clone, Copy)]
pub struct CompilationAssert<'a> {
    actual: &'a Compilation,
}

impl<'a> CompilationAssert<'a> {
    #[must_use]
    pub fn new(actual: &'a Compilation) -> Self {
        Self { actual }
    }

    /// Assert the compilation succeeded.
    ///
    /// On failure the message lists the error diagnostics, plus the warnings
    /// when warnings were treated as errors.
    ///
    /// # Panics
    ///
    /// If the compilation failed.
    #[track_caller]
    pub fn is_successful(self) -> Self {
        if self.actual.is_failure() {
            let kinds: &[DiagnosticKind] = if self.actual.is_fail_on_warnings() {
                &DiagnosticKind::WARNINGS_AND_ERRORS
            } else {
                &DiagnosticKind::ERRORS
            };
            let diagnostics: Vec<&Diagnostic> = self.actual.diagnostics_of(kinds).collect();
            fail_with_diagnostics(
                &diagnostics,
                "Expected a successful compilation, but it failed.",
            );
        }
        self
    }

    /// Assert the compilation succeeded and reported no errors or warnings.
    ///
    /// # Panics
    ///
    /// If the compilation failed or reported any warning.
    #[track_caller]
    pub fn is_successful_without_warnings(self) -> Self {
        self.is_successful().diagnostics().has_no_errors_or_warnings();
        self
    }

    /// Assert the compilation failed. On failure the message lists any
    /// warnings that were reported.
    ///
    /// # Panics
    ///
    /// If the compilation succeeded.
    #[track_caller]
    pub fn is_failure(self) -> Self {
        if self.actual.is_successful() {
            let warnings: Vec<&Diagnostic> = self
                .actual
                .diagnostics_of(&DiagnosticKind::WARNINGS)
                .collect();
            fail_with_diagnostics(&warnings, "Expected compilation to fail, but it succeeded.");
        }
        self
    }

    #[must_use]
    pub fn diagnostics(self) -> DiagnosticListAssert<'a> {
        DiagnosticListAssert::new(self.actual.diagnostics().iter().collect())
    }

    /// Raw lines the compiler printed.
    #[must_use]
    pub fn output_lines(self) -> &'a [String] {
        self.actual.output_lines()
    }

    /// Assertions on a package-oriented location.
    ///
    /// # Panics
    ///
    /// If `location` is module-oriented, or the lookup itself fails.
    #[track_caller]
    pub fn package_group(self, location: impl Into<Location>) -> PackageContainerGroupAssert {
        let location = location.into();
        if location.is_module_oriented_location() {
            fail(format_args!(
                "Expected location {} to not be module-oriented",
                LocationRepresentation.to_string_of(&location)
            ));
        }
        let group = expect_lookup(
            self.actual
                .file_manager()
                .get_package_container_group(&location),
            LocationRepresentation.to_string_of(&location),
        );
        PackageContainerGroupAssert::new(location, group)
    }

    /// Assertions on a module-oriented location.
    ///
    /// # Panics
    ///
    /// If `location` is not module-oriented, or the lookup itself fails.
    #[track_caller]
    pub fn module_group(self, location: impl Into<Location>) -> ModuleContainerGroupAssert {
        let location = location.into();
        if !location.is_module_oriented_location() {
            fail(format_args!(
                "Expected location {} to be module-oriented",
                LocationRepresentation.to_string_of(&location)
            ));
        }
        let group = expect_lookup(
            self.actual
                .file_manager()
                .get_module_container_group(&location),
            LocationRepresentation.to_string_of(&location),
        );
        ModuleContainerGroupAssert::new(location, group)
    }

    /// Assertions on an output location.
    ///
    /// # Panics
    ///
    /// If `location` is not an output location, or the lookup itself fails.
    #[track_caller]
    pub fn output_group(self, location: impl Into<Location>) -> OutputContainerGroupAssert {
        let location = location.into();
        if !location.is_output_location() {
            fail(format_args!(
                "Expected location {} to be an output location",
                LocationRepresentation.to_string_of(&location)
            ));
        }
        let group = expect_lookup(
            self.actual
                .file_manager()
                .get_output_container_group(&location),
            LocationRepresentation.to_string_of(&location),
        );
        OutputContainerGroupAssert::new(location, group)
    }

    #[track_caller]
    pub fn class_output(self) -> OutputContainerGroupAssert {
        self.output_group(StandardLocation::ClassOutput)
    }

    #[track_caller]
    pub fn source_output(self) -> OutputContainerGroupAssert {
        self.output_group(StandardLocation::SourceOutput)
    }

    /// Native headers generated by the compiler.
    #[track_caller]
    pub fn generated_headers(self) -> OutputContainerGroupAssert {
        self.output_group(StandardLocation::NativeHeaderOutput)
    }

    #[track_caller]
    pub fn class_path(self) -> PackageContainerGroupAssert {
        self.package_group(StandardLocation::ClassPath)
    }

    #[track_caller]
    pub fn source_path(self) -> PackageContainerGroupAssert {
        self.package_group(StandardLocation::SourcePath)
    }

    #[track_caller]
    pub fn module_source_path(self) -> ModuleContainerGroupAssert {
        self.module_group(StandardLocation::ModuleSourcePath)
    }

    #[track_caller]
    pub fn module_path(self) -> ModuleContainerGroupAssert {
        self.module_group(StandardLocation::ModulePath)
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;

    use compile_assert_core::InMemoryFileManager;

    use super::*;

    fn panic_message(f: impl FnOnce()) -> String {
        let payload = catch_unwind(AssertUnwindSafe(f)).unwrap_err();
        payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_string()))
            .unwrap()
    }

    fn failed(fail_on_warnings: bool) -> Compilation {
        Compilation::builder(Arc::new(InMemoryFileManager::new("17")))
            .successful(false)
            .fail_on_warnings(fail_on_warnings)
            .diagnostic(Diagnostic::note("processing Foo.java"))
            .diagnostic(Diagnostic::warning("unchecked cast"))
            .diagnostic(Diagnostic::error("cannot find symbol"))
            .build()
    }

    #[test]
    fn is_successful_lists_only_errors() {
        let compilation = failed(false);
        let message = panic_message(|| {
            CompilationAssert::new(&compilation).is_successful();
        });
        assert_eq!(
            message,
            "Expected a successful compilation, but it failed.\n\nDiagnostics:\n\n \
             - [ERROR] cannot find symbol"
        );
    }

    #[test]
    fn is_successful_includes_warnings_when_they_fail_the_build() {
        let compilation = failed(true);
        let message = panic_message(|| {
            CompilationAssert::new(&compilation).is_successful();
        });
        assert!(message.contains(" - [WARNING] unchecked cast\n\n - [ERROR] cannot find symbol"));
        assert!(!message.contains("NOTE"));
    }

    #[test]
    fn is_failure_without_warnings_has_bare_message() {
        let compilation = Compilation::builder(Arc::new(InMemoryFileManager::new("17"))).build();
        let message = panic_message(|| {
            CompilationAssert::new(&compilation).is_failure();
        });
        assert_eq!(message, "Expected compilation to fail, but it succeeded.");
        CompilationAssert::new(&compilation)
            .is_successful()
            .is_successful_without_warnings();
    }

    #[test]
    fn selectors_reject_wrong_location_categories() {
        let compilation = Compilation::builder(Arc::new(InMemoryFileManager::new("17"))).build();
        let assert = CompilationAssert::new(&compilation);

        assert_eq!(
            panic_message(|| {
                assert.package_group(StandardLocation::ModulePath);
            }),
            "Expected location MODULE_PATH to not be module-oriented"
        );
        assert_eq!(
            panic_message(|| {
                assert.module_group(StandardLocation::ClassPath);
            }),
            "Expected location CLASS_PATH to be module-oriented"
        );
        assert_eq!(
            panic_message(|| {
                assert.output_group(StandardLocation::SourcePath);
            }),
            "Expected location SOURCE_PATH to be an output location"
        );
    }
}

//! The outcome of one compiler invocation.

use std::fmt;
use std::sync::Arc;

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::filemanagers::FileManager;

/// Result of running a compiler over an in-memory file manager.
#[derive(Clone)]
pub struct Compilation {
    successful: bool,
    fail_on_warnings: bool,
    diagnostics: Vec<Diagnostic>,
    output_lines: Vec<String>,
    file_manager: Arc<dyn FileManager>,
}

impl Compilation {
    /// Start building a successful compilation over `file_manager`.
    #[must_use]
    pub fn builder(file_manager: Arc<dyn FileManager>) -> CompilationBuilder {
        CompilationBuilder {
            successful: true,
            fail_on_warnings: false,
            diagnostics: Vec::new(),
            output_lines: Vec::new(),
            file_manager,
        }
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.successful
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.successful
    }

    /// Whether warnings were escalated to errors for this compilation.
    #[must_use]
    pub fn is_fail_on_warnings(&self) -> bool {
        self.fail_on_warnings
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics whose kind is one of `kinds`, in report order.
    pub fn diagnostics_of<'a>(
        &'a self,
        kinds: &'a [DiagnosticKind],
    ) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| kinds.contains(&diagnostic.kind))
    }

    /// Raw lines the compiler printed.
    #[must_use]
    pub fn output_lines(&self) -> &[String] {
        &self.output_lines
    }

    #[must_use]
    pub fn file_manager(&self) -> &Arc<dyn FileManager> {
        &self.file_manager
    }
}

impl fmt::Debug for Compilation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compilation")
            .field("successful", &self.successful)
            .field("fail_on_warnings", &self.fail_on_warnings)
            .field("diagnostics", &self.diagnostics.len())
            .field("file_manager", &format_args!("{}", self.file_manager))
            .finish_non_exhaustive()
    }
}

/// Builder for [`Compilation`].
pub struct CompilationBuilder {
    successful: bool,
    fail_on_warnings: bool,
    diagnostics: Vec<Diagnostic>,
    output_lines: Vec<String>,
    file_manager: Arc<dyn FileManager>,
}

impl CompilationBuilder {
    #[must_use]
    pub fn successful(mut self, successful: bool) -> Self {
        self.successful = successful;
        self
    }

    #[must_use]
    pub fn fail_on_warnings(mut self, fail_on_warnings: bool) -> Self {
        self.fail_on_warnings = fail_on_warnings;
        self
    }

    #[must_use]
    pub fn diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    #[must_use]
    pub fn diagnostics(mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        self.diagnostics.extend(diagnostics);
        self
    }

    #[must_use]
    pub fn output_line(mut self, line: impl Into<String>) -> Self {
        self.output_lines.push(line.into());
        self
    }

    #[must_use]
    pub fn output_lines(mut self, lines: impl IntoIterator<Item = String>) -> Self {
        self.output_lines.extend(lines);
        self
    }

    #[must_use]
    pub fn build(self) -> Compilation {
        Compilation {
            successful: self.successful,
            fail_on_warnings: self.fail_on_warnings,
            diagnostics: self.diagnostics,
            output_lines: self.output_lines,
            file_manager: self.file_manager,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filemanagers::InMemoryFileManager;

    #[test]
    fn builder_defaults_to_success() {
        let compilation = Compilation::builder(Arc::new(InMemoryFileManager::new("17"))).build();
        assert!(compilation.is_successful());
        assert!(!compilation.is_failure());
        assert!(!compilation.is_fail_on_warnings());
        assert!(compilation.diagnostics().is_empty());
        assert_eq!(compilation.file_manager().effective_release(), "17");
    }

    #[test]
    fn diagnostics_of_filters_by_kind() {
        let compilation = Compilation::builder(Arc::new(InMemoryFileManager::new("17")))
            .successful(false)
            .diagnostic(Diagnostic::note("processing"))
            .diagnostic(Diagnostic::error("cannot find symbol"))
            .diagnostic(Diagnostic::new(
                DiagnosticKind::MandatoryWarning,
                "deprecated API",
            ))
            .output_line("1 error")
            .build();

        let warnings: Vec<_> = compilation
            .diagnostics_of(&DiagnosticKind::WARNINGS)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(warnings, ["deprecated API"]);
        assert_eq!(
            compilation.diagnostics_of(&DiagnosticKind::ERRORS).count(),
            1
        );
        assert_eq!(compilation.output_lines(), ["1 error"]);
    }
}

//! Compiler diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    Error,
    Warning,
    MandatoryWarning,
    Note,
    Other,
}

impl DiagnosticKind {
    pub const WARNINGS: [DiagnosticKind; 2] = [Self::Warning, Self::MandatoryWarning];
    pub const ERRORS: [DiagnosticKind; 1] = [Self::Error];
    pub const WARNINGS_AND_ERRORS: [DiagnosticKind; 3] =
        [Self::Warning, Self::MandatoryWarning, Self::Error];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::MandatoryWarning => "MANDATORY_WARNING",
            Self::Note => "NOTE",
            Self::Other => "OTHER",
        }
    }

    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::Warning | Self::MandatoryWarning)
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One diagnostic reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u64>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            source: None,
            line: None,
            column: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, message)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, message)
    }

    #[must_use]
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Note, message)
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the source position. Column is optional.
    #[must_use]
    pub fn at(mut self, source: impl Into<String>, line: u64, column: Option<u64>) -> Self {
        self.source = Some(source.into());
        self.line = Some(line);
        self.column = column;
        self
    }
}

impl fmt::Display for Diagnostic {
    /// Renders as `[KIND] source:line:column code: message`, omitting
    /// absent parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(source) = &self.source {
            write!(f, " {source}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
                if let Some(column) = self.column {
                    write!(f, ":{column}")?;
                }
            }
        }
        if let Some(code) = &self.code {
            write!(f, " {code}:")?;
        }
        write!(f, " {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_missing_parts() {
        assert_eq!(Diagnostic::note("hello").to_string(), "[NOTE] hello");
        let full = Diagnostic::error("cannot find symbol")
            .with_code("compiler.err.cant.resolve")
            .at("Foo.java", 3, Some(9));
        assert_eq!(
            full.to_string(),
            "[ERROR] Foo.java:3:9 compiler.err.cant.resolve: cannot find symbol"
        );
    }

    #[test]
    fn kinds_deserialize_from_upper_snake() {
        let kind: DiagnosticKind = serde_json::from_str(r#""MANDATORY_WARNING""#).unwrap();
        assert_eq!(kind, DiagnosticKind::MandatoryWarning);
        assert!(kind.is_warning());
        assert!(!kind.is_error());
    }
}

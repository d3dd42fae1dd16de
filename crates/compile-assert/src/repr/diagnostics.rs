use compile_assert_core::Diagnostic;

use super::Representation;

/// Renders diagnostics one per paragraph, each indented under a bullet.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiagnosticListRepresentation;

impl DiagnosticListRepresentation {
    fn render(diagnostic: &Diagnostic) -> String {
        let mut lines = diagnostic.to_string().lines().map(str::to_owned).collect::<Vec<_>>();
        for (i, line) in lines.iter_mut().enumerate() {
            let prefix = if i == 0 { " - " } else { "   " };
            line.insert_str(0, prefix);
        }
        lines.join("\n")
    }
}

impl Representation<[Diagnostic]> for DiagnosticListRepresentation {
    fn to_string_of(&self, value: &[Diagnostic]) -> String {
        value.iter().map(Self::render).collect::<Vec<_>>().join("\n\n")
    }
}

impl<'a> Representation<[&'a Diagnostic]> for DiagnosticListRepresentation {
    fn to_string_of(&self, value: &[&'a Diagnostic]) -> String {
        value
            .iter()
            .map(|diagnostic| Self::render(diagnostic))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_block_per_diagnostic() {
        let diagnostics = [
            Diagnostic::error("cannot find symbol\n  symbol: class Bar").at("Foo.java", 3, Some(9)),
            Diagnostic::warning("unchecked cast").with_code("compiler.warn.unchecked"),
        ];
        assert_eq!(
            DiagnosticListRepresentation.to_string_of(&diagnostics[..]),
            " - [ERROR] Foo.java:3:9 cannot find symbol\n     symbol: class Bar\n\n \
             - [WARNING] compiler.warn.unchecked: unchecked cast"
        );
    }

    #[test]
    fn empty_list_renders_empty() {
        let empty: [&Diagnostic; 0] = [];
        assert_eq!(DiagnosticListRepresentation.to_string_of(&empty[..]), "");
    }
}

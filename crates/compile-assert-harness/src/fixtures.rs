//! Recorded compilations and the expectations attached to them.

use std::collections::BTreeMap;
use std::path::Path;

use compile_assert_core::{Diagnostic, Location, StandardLocation};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// What a fixture expects of its compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Success,
    SuccessWithoutWarnings,
    Failure,
}

/// A recorded compilation plus the assertions to run against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationFixture {
    /// Fixture identifier.
    pub name: String,
    /// Release the file manager reports.
    #[serde(default = "default_release")]
    pub release: String,
    /// Whether the compiler reported success.
    pub successful: bool,
    /// Whether warnings were treated as errors.
    #[serde(default)]
    pub fail_on_warnings: bool,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    #[serde(default)]
    pub output_lines: Vec<String>,
    /// Files written by the compiler: location name, then relative path, then UTF-8 content.
    #[serde(default)]
    pub outputs: BTreeMap<String, BTreeMap<String, String>>,
    pub expect: Expectation,
    /// Paths that must exist afterwards, keyed by location name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expected_files: BTreeMap<String, Vec<String>>,
}

fn default_release() -> String {
    "17".to_string()
}

/// A collection of compilation fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    pub fixtures: Vec<CompilationFixture>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

/// Parse a location name: `CLASS_OUTPUT` or `CLASS_OUTPUT[module.name]`.
pub fn parse_location(name: &str) -> Result<Location, HarnessError> {
    let unknown = || HarnessError::UnknownLocation {
        name: name.to_string(),
    };
    let name = name.trim();
    match name.split_once('[') {
        Some((parent, rest)) => {
            let module = rest.strip_suffix(']').filter(|m| !m.is_empty()).ok_or_else(unknown)?;
            let parent = StandardLocation::from_name(parent).ok_or_else(unknown)?;
            Ok(Location::module(parent, module))
        }
        None => StandardLocation::from_name(name)
            .map(Location::from)
            .ok_or_else(unknown),
    }
}

#[cfg(test)]
mod tests {
    use compile_assert_core::DiagnosticKind;

    use super::*;

    #[test]
    fn parses_fixture_json_with_defaults() {
        let set = FixtureSet::from_json(
            r#"{
                "version": "v1",
                "fixtures": [
                    {
                        "name": "hello",
                        "successful": true,
                        "diagnostics": [{"kind": "MANDATORY_WARNING", "message": "deprecated"}],
                        "outputs": {"CLASS_OUTPUT": {"com/example/Hello.class": "bytes"}},
                        "expect": "success_without_warnings"
                    }
                ]
            }"#,
        )
        .expect("valid fixture json");

        let fixture = &set.fixtures[0];
        assert_eq!(fixture.release, "17");
        assert!(!fixture.fail_on_warnings);
        assert_eq!(fixture.expect, Expectation::SuccessWithoutWarnings);
        assert_eq!(fixture.diagnostics[0].kind, DiagnosticKind::MandatoryWarning);
        assert!(fixture.expected_files.is_empty());
        assert!(set.to_json().unwrap().contains("\"success_without_warnings\""));
    }

    #[test]
    fn parses_location_names() {
        assert_eq!(
            parse_location("CLASS_OUTPUT").unwrap(),
            Location::from(StandardLocation::ClassOutput)
        );
        assert_eq!(
            parse_location("CLASS_OUTPUT[org.example]").unwrap(),
            Location::module(StandardLocation::ClassOutput, "org.example")
        );
        for bad in ["CLASS_OUT", "CLASS_OUTPUT[]", "CLASS_OUTPUT[org", "NOPE[x]"] {
            assert!(matches!(
                parse_location(bad),
                Err(HarnessError::UnknownLocation { .. })
            ));
        }
    }
}

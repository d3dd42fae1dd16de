//! Aggregate fixture verification report.

use serde::{Deserialize, Serialize};

use crate::runner::FixtureOutcome;

/// Summary of one verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureReport {
    /// Logging mode the file managers ran under.
    pub logging: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<FixtureOutcome>,
}

impl FixtureReport {
    #[must_use]
    pub fn from_outcomes(logging: impl Into<String>, outcomes: Vec<FixtureOutcome>) -> Self {
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|o| o.passed).count();
        Self {
            logging: logging.into(),
            total,
            passed,
            failed: total - passed,
            outcomes,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

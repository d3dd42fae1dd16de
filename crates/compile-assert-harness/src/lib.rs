//! Fixture harness for compile-assert.
//!
//! This crate provides:
//! - Fixtures: recorded compilations (status, diagnostics, output files) as JSON
//! - Runner: rebuild each compilation over an in-memory file manager, optionally
//!   logged, and apply the fixture's expectations
//! - Report: machine-readable pass/fail summary

pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;

pub use error::HarnessError;
pub use fixtures::{CompilationFixture, Expectation, FixtureSet};
pub use report::FixtureReport;
pub use runner::{FixtureOutcome, FixtureRunner};

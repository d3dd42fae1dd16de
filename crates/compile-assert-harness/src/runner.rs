//! Fixture execution engine.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use compile_assert::assert_that;
use compile_assert_core::filemanagers::{CallSink, wrap_for_mode};
use compile_assert_core::{
    Compilation, Container, FileManager, InMemoryFileManager, Location, LoggingFileManager,
    LoggingMode,
};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::fixtures::{CompilationFixture, Expectation, FixtureSet, parse_location};

/// Result of evaluating one fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureOutcome {
    pub name: String,
    pub passed: bool,
    /// The assertion failure message, when the fixture failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Builds a compilation per fixture and applies its expectations.
pub struct FixtureRunner {
    logging: LoggingMode,
    sink: Option<Arc<dyn CallSink>>,
}

impl FixtureRunner {
    #[must_use]
    pub fn new(logging: LoggingMode) -> Self {
        Self {
            logging,
            sink: None,
        }
    }

    /// Record file-manager calls into `sink` instead of `tracing`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn CallSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn logging(&self) -> LoggingMode {
        self.logging
    }

    /// Run every fixture in a set.
    pub fn run(&self, set: &FixtureSet) -> Result<Vec<FixtureOutcome>, HarnessError> {
        set.fixtures
            .iter()
            .map(|fixture| self.run_fixture(fixture))
            .collect()
    }

    pub fn run_fixture(&self, fixture: &CompilationFixture) -> Result<FixtureOutcome, HarnessError> {
        let compilation = self.build_compilation(fixture)?;
        let expected_files = fixture
            .expected_files
            .iter()
            .map(|(name, paths)| Ok((parse_location(name)?, paths.as_slice())))
            .collect::<Result<Vec<_>, HarnessError>>()?;

        let result = catch_unwind_quietly(|| {
            let assert = assert_that(&compilation);
            match fixture.expect {
                Expectation::Success => assert.is_successful(),
                Expectation::SuccessWithoutWarnings => assert.is_successful_without_warnings(),
                Expectation::Failure => assert.is_failure(),
            };
            for (location, paths) in &expected_files {
                assert.package_group(location.clone()).all_files_exist(*paths);
            }
        });
        let closed = compilation.file_manager().close();

        let failure = result.err().map(|payload| panic_message(payload.as_ref()));
        match &failure {
            None => tracing::info!(fixture = %fixture.name, "fixture passed"),
            Some(message) => tracing::warn!(fixture = %fixture.name, %message, "fixture failed"),
        }
        closed?;

        Ok(FixtureOutcome {
            name: fixture.name.clone(),
            passed: failure.is_none(),
            failure,
        })
    }

    /// Materialise a fixture as a compilation over an in-memory file manager,
    /// wrapped for logging when the runner's mode asks for it.
    pub fn build_compilation(&self, fixture: &CompilationFixture) -> Result<Compilation, HarnessError> {
        let fm = InMemoryFileManager::new(fixture.release.clone());
        for (name, files) in &fixture.outputs {
            let location = parse_location(name)?;
            populate(&fm, &location, files)?;
        }

        let fm: Arc<dyn FileManager> = match (&self.sink, self.logging) {
            (Some(sink), mode) if mode.is_enabled() => Arc::new(LoggingFileManager::with_sink(
                fm,
                mode.stack_traces(),
                Arc::clone(sink),
            )),
            (_, mode) => Arc::from(wrap_for_mode(fm, mode)),
        };
        tracing::debug!(fixture = %fixture.name, file_manager = %fm, "built compilation");

        Ok(Compilation::builder(fm)
            .successful(fixture.successful)
            .fail_on_warnings(fixture.fail_on_warnings)
            .diagnostics(fixture.diagnostics.iter().cloned())
            .output_lines(fixture.output_lines.iter().cloned())
            .build())
    }
}

fn populate(
    fm: &InMemoryFileManager,
    location: &Location,
    files: &BTreeMap<String, String>,
) -> Result<(), HarnessError> {
    let container = files
        .iter()
        .fold(Container::new(location.name()), |container, (path, content)| {
            container.with_file(path, content.as_bytes())
        });
    let container = Arc::new(container);
    match location {
        Location::Module(module) => fm.add_module_container(
            &Location::from(module.parent),
            &module.module_name,
            container,
        )?,
        Location::Standard(_) => fm.add_container(location, container)?,
    }
    Ok(())
}

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Run `f`, catching an assertion panic without the panic hook printing it.
///
/// The hook is installed once and defers to the previous hook on every
/// thread that is not inside this call.
fn catch_unwind_quietly<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !QUIET_PANICS.with(Cell::get) {
                previous(info);
            }
        }));
    });
    let was_quiet = QUIET_PANICS.with(|quiet| quiet.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    QUIET_PANICS.with(|quiet| quiet.set(was_quiet));
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "assertion panicked with a non-string payload".to_string()
    }
}

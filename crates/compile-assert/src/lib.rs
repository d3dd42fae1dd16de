//! Fluent assertions over the results of programmatic compilation.
//!
//! ```rust,ignore
//! use compile_assert::assert_that;
//!
//! assert_that(&compilation)
//!     .is_successful_without_warnings()
//!     .class_output()
//!     .file_exists("com/example/Foo.class")
//!     .is_not_empty();
//! ```
//!
//! Every assertion fails by panicking at the caller's location, so they drop
//! straight into `#[test]` functions.

mod compilation;
mod diagnostics;
mod failure;
mod file;
mod groups;
pub mod repr;

pub use compilation::CompilationAssert;
pub use diagnostics::{DiagnosticAssert, DiagnosticListAssert};
pub use file::FileAssert;
pub use groups::{ModuleContainerGroupAssert, OutputContainerGroupAssert, PackageContainerGroupAssert};

use compile_assert_core::Compilation;

/// Begin asserting on `compilation`.
#[must_use]
pub fn assert_that(compilation: &Compilation) -> CompilationAssert<'_> {
    CompilationAssert::new(compilation)
}

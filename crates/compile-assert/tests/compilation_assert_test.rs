//! Integration test: compilation assertions over an in-memory file manager
//!
//! Validates that:
//! 1. Successful compilations pass the success assertions and expose outputs.
//! 2. Failed compilations fail `is_successful` with the error diagnostics.
//! 3. Location selectors reach the file manager's container groups.
//! 4. Assertions work unchanged through a logging file manager.
//!
//! Run: cargo test -p compile-assert --test compilation_assert_test

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use compile_assert::assert_that;
use compile_assert_core::filemanagers::{CallEventKind, MemorySink};
use compile_assert_core::{
    Compilation, Container, Diagnostic, FileManager, InMemoryFileManager, Location,
    LoggingFileManager, StandardLocation,
};

fn panic_message(f: impl FnOnce()) -> String {
    let payload = catch_unwind(AssertUnwindSafe(f)).expect_err("assertion should have failed");
    payload
        .downcast_ref::<String>()
        .cloned()
        .expect("assertion panics carry a formatted message")
}

fn populated_manager() -> InMemoryFileManager {
    let fm = InMemoryFileManager::new("17");
    fm.add_container(
        &StandardLocation::SourcePath.into(),
        Arc::new(Container::new("src").with_file(
            "com/example/Foo.java",
            "package com.example; class Foo {}",
        )),
    )
    .unwrap();
    fm.add_module_container(
        &StandardLocation::ModuleSourcePath.into(),
        "org.example",
        Arc::new(Container::new("org.example").with_file("module-info.java", "module org.example {}")),
    )
    .unwrap();
    fm.write_file(
        &StandardLocation::ClassOutput.into(),
        "com.example",
        "Foo.class",
        &[0xCA, 0xFE, 0xBA, 0xBE],
    )
    .unwrap();
    fm
}

#[test]
fn successful_compilation_exposes_outputs() {
    let compilation = Compilation::builder(Arc::new(populated_manager()))
        .diagnostic(Diagnostic::note("compiling 1 source file"))
        .build();

    let assert = assert_that(&compilation).is_successful_without_warnings();
    assert
        .class_output()
        .is_configured()
        .file_does_not_exist("com/example/Bar.class")
        .file_exists("com/example/Foo.class")
        .has_content([0xCA_u8, 0xFE, 0xBA, 0xBE]);
    assert
        .source_path()
        .file_exists("com/example/Foo.java")
        .contains_text("class Foo");
    assert
        .module_source_path()
        .module_exists("org.example")
        .file_exists("module-info.java");
    assert.class_path().is_not_configured();
    assert.source_output().is_not_configured();
    assert.generated_headers().is_not_configured();
    assert.module_path().is_not_configured();
    assert.diagnostics().notes().has_count(1);
}

#[test]
fn failed_compilation_reports_errors() {
    let compilation = Compilation::builder(Arc::new(populated_manager()))
        .successful(false)
        .diagnostic(Diagnostic::warning("unchecked cast"))
        .diagnostic(Diagnostic::error("cannot find symbol").at("Foo.java", 1, Some(22)))
        .build();

    assert_that(&compilation)
        .is_failure()
        .diagnostics()
        .errors()
        .first()
        .message_contains("cannot find symbol")
        .is_on_line(1);

    let message = panic_message(|| {
        assert_that(&compilation).is_successful();
    });
    assert_eq!(
        message,
        "Expected a successful compilation, but it failed.\n\nDiagnostics:\n\n \
         - [ERROR] Foo.java:1:22 cannot find symbol"
    );
}

#[test]
fn output_group_rejects_non_output_module_location() {
    let compilation = Compilation::builder(Arc::new(populated_manager())).build();
    let message = panic_message(|| {
        assert_that(&compilation).output_group(Location::module(
            StandardLocation::ModulePath,
            "org.example",
        ));
    });
    assert_eq!(
        message,
        "Expected location MODULE_PATH[org.example] to be an output location"
    );
}

#[test]
fn closed_file_manager_lookups_fail_loudly() {
    let fm = populated_manager();
    fm.close().unwrap();
    let compilation = Compilation::builder(Arc::new(fm)).build();
    let message = panic_message(|| {
        assert_that(&compilation).class_output();
    });
    assert_eq!(
        message,
        "Failed to look up CLASS_OUTPUT: file manager has been closed"
    );
}

#[test]
fn assertions_work_through_a_logging_file_manager() {
    let sink = Arc::new(MemorySink::new());
    let logged: Arc<dyn FileManager> = Arc::new(LoggingFileManager::with_sink(
        populated_manager(),
        false,
        sink.clone(),
    ));
    let compilation = Compilation::builder(logged).build();

    assert_that(&compilation)
        .class_output()
        .file_exists("com/example/Foo.class")
        .is_not_empty();

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, CallEventKind::Entry);
    assert_eq!(events[0].operation, "get_output_container_group");
    assert_eq!(events[1].kind, CallEventKind::ExitNormal);
    assert_eq!(events[1].depth, 1);
}

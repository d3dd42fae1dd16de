//! Domain model for compile-assert.
//!
//! The pieces a compilation test asserts on:
//! - **Locations** (`location`): standard and per-module compiler locations
//! - **Containers** (`container`): in-memory roots and the groups built from them
//! - **Diagnostics** (`diagnostic`): what the compiler reported
//! - **Compilations** (`compilation`): status, diagnostics and the file manager used
//! - **File managers** (`filemanagers`): the capability trait, an in-memory
//!   implementation, and a delegate that logs every call
//! - **Configuration** (`config`): default file-manager logging mode

pub mod compilation;
pub mod config;
pub mod container;
pub mod diagnostic;
pub mod error;
pub mod filemanagers;
pub mod location;

pub use compilation::{Compilation, CompilationBuilder};
pub use config::LoggingMode;
pub use container::{
    Container, FileKind, FileObject, ModuleContainerGroup, OutputContainerGroup,
    PackageContainerGroup,
};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{FileManagerError, FileManagerErrorKind, Result};
pub use filemanagers::{FileManager, InMemoryFileManager, LoggingFileManager};
pub use location::{Location, ModuleLocation, StandardLocation};

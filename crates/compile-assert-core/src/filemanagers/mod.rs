//! The file-manager capability interface and its implementations.
//!
//! [`FileManager`] is the contract a compiler uses to resolve locations and
//! read or write files during an in-memory compilation. Two implementations
//! live here:
//! - [`InMemoryFileManager`]: containers held entirely in memory.
//! - [`LoggingFileManager`]: a transparent delegate that logs every call made
//!   against another file manager.

mod call_log;
mod in_memory;
mod logging;

use std::fmt;
use std::sync::Arc;

pub use call_log::{CallEvent, CallEventKind, CallSink, JsonlSink, MemorySink, TracingSink};
pub use in_memory::InMemoryFileManager;
pub use logging::{LoggingFileManager, Operation, wrap_for_mode};

use crate::container::{
    Container, FileKind, FileObject, ModuleContainerGroup, OutputContainerGroup,
    PackageContainerGroup,
};
use crate::error::Result;
use crate::location::Location;

/// Capability interface over the locations and files of one compilation.
///
/// Group getters validate the location category before any lookup:
/// package groups reject module-oriented locations, module groups require a
/// module-oriented or output location, and output groups require an output
/// location. Unconfigured locations resolve to `Ok(None)`.
///
/// `Display` is the identity rendering of an implementation.
pub trait FileManager: fmt::Display + fmt::Debug + Send + Sync {
    /// Register a root under a package-oriented or output location.
    fn add_container(&self, location: &Location, container: Arc<Container>) -> Result<()>;

    /// Register a root for one module under a module-oriented or output location.
    fn add_module_container(
        &self,
        location: &Location,
        module_name: &str,
        container: Arc<Container>,
    ) -> Result<()>;

    /// Ensure `location` exists, backed by a single empty container if new.
    fn create_empty_location(&self, location: &Location) -> Result<()>;

    fn has_location(&self, location: &Location) -> bool;

    fn contains(&self, location: &Location, path: &str) -> Result<bool>;

    fn get_package_container_group(
        &self,
        location: &Location,
    ) -> Result<Option<PackageContainerGroup>>;

    fn get_module_container_group(&self, location: &Location)
    -> Result<Option<ModuleContainerGroup>>;

    fn get_output_container_group(&self, location: &Location)
    -> Result<Option<OutputContainerGroup>>;

    /// Every configured package-oriented group, output groups included.
    fn get_package_container_groups(&self) -> Result<Vec<PackageContainerGroup>>;

    fn list(
        &self,
        location: &Location,
        package_name: &str,
        kinds: &[FileKind],
        recurse: bool,
    ) -> Result<Vec<FileObject>>;

    fn get_file_for_input(
        &self,
        location: &Location,
        package_name: &str,
        relative_name: &str,
    ) -> Result<Option<FileObject>>;

    /// Write a file into an output location, creating the location if needed.
    fn write_file(
        &self,
        location: &Location,
        package_name: &str,
        relative_name: &str,
        content: &[u8],
    ) -> Result<FileObject>;

    fn read_file(&self, file: &FileObject) -> Result<Vec<u8>>;

    /// Dotted binary name of `file`, if it belongs to `location`.
    fn infer_binary_name(&self, location: &Location, file: &FileObject) -> Result<Option<String>>;

    fn effective_release(&self) -> String;

    fn flush(&self) -> Result<()>;

    fn close(&self) -> Result<()>;
}

macro_rules! forward_file_manager {
    ($wrapper:ident) => {
        impl<F: FileManager + ?Sized> FileManager for $wrapper<F> {
            fn add_container(&self, location: &Location, container: Arc<Container>) -> Result<()> {
                (**self).add_container(location, container)
            }

            fn add_module_container(
                &self,
                location: &Location,
                module_name: &str,
                container: Arc<Container>,
            ) -> Result<()> {
                (**self).add_module_container(location, module_name, container)
            }

            fn create_empty_location(&self, location: &Location) -> Result<()> {
                (**self).create_empty_location(location)
            }

            fn has_location(&self, location: &Location) -> bool {
                (**self).has_location(location)
            }

            fn contains(&self, location: &Location, path: &str) -> Result<bool> {
                (**self).contains(location, path)
            }

            fn get_package_container_group(
                &self,
                location: &Location,
            ) -> Result<Option<PackageContainerGroup>> {
                (**self).get_package_container_group(location)
            }

            fn get_module_container_group(
                &self,
                location: &Location,
            ) -> Result<Option<ModuleContainerGroup>> {
                (**self).get_module_container_group(location)
            }

            fn get_output_container_group(
                &self,
                location: &Location,
            ) -> Result<Option<OutputContainerGroup>> {
                (**self).get_output_container_group(location)
            }

            fn get_package_container_groups(&self) -> Result<Vec<PackageContainerGroup>> {
                (**self).get_package_container_groups()
            }

            fn list(
                &self,
                location: &Location,
                package_name: &str,
                kinds: &[FileKind],
                recurse: bool,
            ) -> Result<Vec<FileObject>> {
                (**self).list(location, package_name, kinds, recurse)
            }

            fn get_file_for_input(
                &self,
                location: &Location,
                package_name: &str,
                relative_name: &str,
            ) -> Result<Option<FileObject>> {
                (**self).get_file_for_input(location, package_name, relative_name)
            }

            fn write_file(
                &self,
                location: &Location,
                package_name: &str,
                relative_name: &str,
                content: &[u8],
            ) -> Result<FileObject> {
                (**self).write_file(location, package_name, relative_name, content)
            }

            fn read_file(&self, file: &FileObject) -> Result<Vec<u8>> {
                (**self).read_file(file)
            }

            fn infer_binary_name(
                &self,
                location: &Location,
                file: &FileObject,
            ) -> Result<Option<String>> {
                (**self).infer_binary_name(location, file)
            }

            fn effective_release(&self) -> String {
                (**self).effective_release()
            }

            fn flush(&self) -> Result<()> {
                (**self).flush()
            }

            fn close(&self) -> Result<()> {
                (**self).close()
            }
        }
    };
}

forward_file_manager!(Box);
forward_file_manager!(Arc);

//! Assertions on the container groups a file manager holds for a location.

use compile_assert_core::container::normalize_path;
use compile_assert_core::{
    Location, ModuleContainerGroup, OutputContainerGroup, PackageContainerGroup,
};

use crate::failure::fail;
use crate::file::FileAssert;
use crate::repr::{LocationRepresentation, Representation};

fn location_name(location: &Location) -> String {
    LocationRepresentation.to_string_of(location)
}

#[track_caller]
fn require_configured<'g, G>(location: &Location, group: Option<&'g G>) -> &'g G {
    match group {
        Some(group) => group,
        None => fail(format_args!(
            "Expected location {} to be configured, but it was not.",
            location_name(location)
        )),
    }
}

/// Fluent assertions on a package-oriented location.
#[derive(Debug, Clone)]
pub struct PackageContainerGroupAssert {
    location: Location,
    actual: Option<PackageContainerGroup>,
}

impl PackageContainerGroupAssert {
    #[must_use]
    pub fn new(location: Location, actual: Option<PackageContainerGroup>) -> Self {
        Self { location, actual }
    }

    #[must_use]
    pub fn actual(&self) -> Option<&PackageContainerGroup> {
        self.actual.as_ref()
    }

    #[track_caller]
    fn group(&self) -> &PackageContainerGroup {
        require_configured(&self.location, self.actual.as_ref())
    }

    fn describe_files(group: &PackageContainerGroup) -> String {
        let paths: Vec<String> = group
            .containers()
            .iter()
            .flat_map(|container| {
                container
                    .paths()
                    .into_iter()
                    .map(move |path| format!(" - {}/{path}", container.name()))
            })
            .collect();
        if paths.is_empty() {
            "No files were present.".to_string()
        } else {
            format!("Files present:\n{}", paths.join("\n"))
        }
    }

    /// # Panics
    ///
    /// If the location has no container group.
    #[track_caller]
    pub fn is_configured(&self) -> &Self {
        self.group();
        self
    }

    /// # Panics
    ///
    /// If the location has a container group.
    #[track_caller]
    pub fn is_not_configured(&self) -> &Self {
        if self.actual.is_some() {
            fail(format_args!(
                "Expected location {} to not be configured, but it was.",
                location_name(&self.location)
            ));
        }
        self
    }

    /// Assert `path` exists in some container of this group and continue
    /// with assertions on the first match.
    ///
    /// # Panics
    ///
    /// If the location is not configured or holds no such file.
    #[track_caller]
    pub fn file_exists(&self, path: &str) -> FileAssert {
        let group = self.group();
        let path = normalize_path(path);
        match group.read(&path) {
            Some(content) => FileAssert::new(location_name(&self.location), path, content),
            None => fail(format_args!(
                "Expected file {path} to exist in {}, but it did not.\n\n{}",
                location_name(&self.location),
                Self::describe_files(group)
            )),
        }
    }

    /// # Panics
    ///
    /// If the location holds `path`.
    #[track_caller]
    pub fn file_does_not_exist(&self, path: &str) -> &Self {
        let path = normalize_path(path);
        if self.actual.as_ref().is_some_and(|group| group.contains(&path)) {
            fail(format_args!(
                "Expected file {path} to not exist in {}, but it did.",
                location_name(&self.location)
            ));
        }
        self
    }

    /// # Panics
    ///
    /// If any of `paths` is missing, naming every missing one.
    #[track_caller]
    pub fn all_files_exist<I, S>(&self, paths: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let group = self.group();
        let missing: Vec<String> = paths
            .into_iter()
            .map(|path| normalize_path(path.as_ref()))
            .filter(|path| !group.contains(path))
            .collect();
        if !missing.is_empty() {
            fail(format_args!(
                "Expected all files to exist in {}, but these did not: {}.\n\n{}",
                location_name(&self.location),
                missing.join(", "),
                Self::describe_files(group)
            ));
        }
        self
    }
}

/// Fluent assertions on a module-oriented location.
#[derive(Debug, Clone)]
pub struct ModuleContainerGroupAssert {
    location: Location,
    actual: Option<ModuleContainerGroup>,
}

impl ModuleContainerGroupAssert {
    #[must_use]
    pub fn new(location: Location, actual: Option<ModuleContainerGroup>) -> Self {
        Self { location, actual }
    }

    #[must_use]
    pub fn actual(&self) -> Option<&ModuleContainerGroup> {
        self.actual.as_ref()
    }

    /// # Panics
    ///
    /// If the location has no container group.
    #[track_caller]
    pub fn is_configured(&self) -> &Self {
        require_configured(&self.location, self.actual.as_ref());
        self
    }

    /// # Panics
    ///
    /// If the location has a container group.
    #[track_caller]
    pub fn is_not_configured(&self) -> &Self {
        if self.actual.is_some() {
            fail(format_args!(
                "Expected location {} to not be configured, but it was.",
                location_name(&self.location)
            ));
        }
        self
    }

    /// Assertions on the package group of one module.
    ///
    /// # Panics
    ///
    /// If the location is not configured or has no such module.
    #[track_caller]
    pub fn module_exists(&self, module_name: &str) -> PackageContainerGroupAssert {
        let group = require_configured(&self.location, self.actual.as_ref());
        module_group_assert(&self.location, group.get_module(module_name), module_name, || {
            group.modules().keys().cloned().collect()
        })
    }
}

#[track_caller]
fn module_group_assert(
    location: &Location,
    module: Option<&PackageContainerGroup>,
    module_name: &str,
    known: impl FnOnce() -> Vec<String>,
) -> PackageContainerGroupAssert {
    match module {
        Some(module) => {
            PackageContainerGroupAssert::new(module.location().clone(), Some(module.clone()))
        }
        None => {
            let known = known();
            fail(format_args!(
                "Expected module {module_name} to exist in {}, but it did not. Modules present: [{}]",
                location_name(location),
                known.join(", ")
            ))
        }
    }
}

/// Fluent assertions on an output location, which holds both its own
/// package roots and per-module roots.
#[derive(Debug, Clone)]
pub struct OutputContainerGroupAssert {
    location: Location,
    actual: Option<OutputContainerGroup>,
}

impl OutputContainerGroupAssert {
    #[must_use]
    pub fn new(location: Location, actual: Option<OutputContainerGroup>) -> Self {
        Self { location, actual }
    }

    #[must_use]
    pub fn actual(&self) -> Option<&OutputContainerGroup> {
        self.actual.as_ref()
    }

    fn packages(&self) -> PackageContainerGroupAssert {
        PackageContainerGroupAssert::new(
            self.location.clone(),
            self.actual
                .as_ref()
                .map(|group| group.as_package_group().clone()),
        )
    }

    /// # Panics
    ///
    /// If the location has no container group.
    #[track_caller]
    pub fn is_configured(&self) -> &Self {
        require_configured(&self.location, self.actual.as_ref());
        self
    }

    /// # Panics
    ///
    /// If the location has a container group.
    #[track_caller]
    pub fn is_not_configured(&self) -> &Self {
        self.packages().is_not_configured();
        self
    }

    /// # Panics
    ///
    /// If the location is not configured or holds no such file.
    #[track_caller]
    pub fn file_exists(&self, path: &str) -> FileAssert {
        self.packages().file_exists(path)
    }

    /// # Panics
    ///
    /// If the location holds `path`.
    #[track_caller]
    pub fn file_does_not_exist(&self, path: &str) -> &Self {
        self.packages().file_does_not_exist(path);
        self
    }

    /// # Panics
    ///
    /// If any of `paths` is missing.
    #[track_caller]
    pub fn all_files_exist<I, S>(&self, paths: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.packages().all_files_exist(paths);
        self
    }

    /// # Panics
    ///
    /// If the location is not configured or has no such module.
    #[track_caller]
    pub fn module_exists(&self, module_name: &str) -> PackageContainerGroupAssert {
        let group = require_configured(&self.location, self.actual.as_ref());
        module_group_assert(&self.location, group.get_module(module_name), module_name, || {
            group.modules().keys().cloned().collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;

    use compile_assert_core::{Container, StandardLocation};

    use super::*;

    fn panic_message(f: impl FnOnce()) -> String {
        let payload = catch_unwind(AssertUnwindSafe(f)).unwrap_err();
        payload.downcast_ref::<String>().cloned().unwrap()
    }

    fn class_output() -> OutputContainerGroupAssert {
        let location = Location::from(StandardLocation::ClassOutput);
        let root = Container::new("classes")
            .with_file("com/example/Foo.class", [0xCA_u8, 0xFE])
            .with_file("com/example/Foo.txt", "hello");
        let package = PackageContainerGroup::new(location.clone(), vec![Arc::new(root)]);
        let module_location = Location::module(StandardLocation::ClassOutput, "org.example");
        let mut modules = BTreeMap::new();
        modules.insert(
            "org.example".to_string(),
            PackageContainerGroup::new(
                module_location,
                vec![Arc::new(Container::new("org.example").with_file("module-info.class", [1_u8]))],
            ),
        );
        OutputContainerGroupAssert::new(location, Some(OutputContainerGroup::new(package, modules)))
    }

    #[test]
    fn file_assertions_chain() {
        let output = class_output();
        output
            .is_configured()
            .file_does_not_exist("com/example/Bar.class")
            .all_files_exist(["com/example/Foo.class", "/com/example/Foo.txt"]);
        output
            .file_exists("com/example/Foo.class")
            .has_content([0xCA_u8, 0xFE])
            .is_not_empty();
        output.file_exists("com/example/Foo.txt").contains_text("ell");
        output
            .module_exists("org.example")
            .is_configured()
            .file_exists("module-info.class");
    }

    #[test]
    fn missing_file_lists_what_is_present() {
        let output = class_output();
        let message = panic_message(|| {
            output.file_exists("com/example/Bar.class");
        });
        assert_eq!(
            message,
            "Expected file com/example/Bar.class to exist in CLASS_OUTPUT, but it did not.\n\n\
             Files present:\n - classes/com/example/Foo.class\n - classes/com/example/Foo.txt"
        );
    }

    #[test]
    fn missing_module_names_known_modules() {
        let output = class_output();
        let message = panic_message(|| {
            output.module_exists("org.other");
        });
        assert_eq!(
            message,
            "Expected module org.other to exist in CLASS_OUTPUT, but it did not. \
             Modules present: [org.example]"
        );
    }

    #[test]
    fn unconfigured_groups() {
        let group = PackageContainerGroupAssert::new(StandardLocation::ClassPath.into(), None);
        group.is_not_configured().file_does_not_exist("Foo.class");
        let message = panic_message(|| {
            group.is_configured();
        });
        assert_eq!(
            message,
            "Expected location CLASS_PATH to be configured, but it was not."
        );

        let modules = ModuleContainerGroupAssert::new(StandardLocation::ModulePath.into(), None);
        modules.is_not_configured();
        let message = panic_message(|| {
            modules.module_exists("org.example");
        });
        assert!(message.starts_with("Expected location MODULE_PATH to be configured"));
    }

    #[test]
    fn binary_files_are_not_text() {
        let output = class_output();
        let message = panic_message(|| {
            output
                .file_exists("com/example/Foo.class")
                .contains_text("Foo");
        });
        assert_eq!(
            message,
            "Expected CLASS_OUTPUT:com/example/Foo.class to be UTF-8 text, but it was binary."
        );
    }
}

//! File manager backed entirely by in-memory containers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::container::{
    Container, FileKind, FileObject, ModuleContainerGroup, OutputContainerGroup,
    PackageContainerGroup, resolve_in_package,
};
use crate::error::{FileManagerError, FileManagerErrorKind, Result};
use crate::filemanagers::FileManager;
use crate::location::{Location, ModuleLocation};

#[derive(Debug, Default)]
struct State {
    /// Package-oriented and output roots, keyed by standard location.
    packages: BTreeMap<Location, Vec<Arc<Container>>>,
    /// Per-module roots of module-oriented and output locations.
    modules: BTreeMap<Location, BTreeMap<String, Vec<Arc<Container>>>>,
}

impl State {
    fn package_roots(&self, location: &Location) -> Option<&Vec<Arc<Container>>> {
        match location {
            Location::Standard(_) => self.packages.get(location),
            Location::Module(ModuleLocation {
                parent,
                module_name,
            }) => self
                .modules
                .get(&Location::Standard(*parent))
                .and_then(|modules| modules.get(module_name)),
        }
    }

    fn package_group(&self, location: &Location) -> Option<PackageContainerGroup> {
        self.package_roots(location)
            .map(|roots| PackageContainerGroup::new(location.clone(), roots.clone()))
    }

    fn module_groups(&self, location: &Location) -> Option<BTreeMap<String, PackageContainerGroup>> {
        let Location::Standard(parent) = location else {
            return None;
        };
        self.modules.get(location).map(|modules| {
            modules
                .iter()
                .map(|(name, roots)| {
                    let module_location = Location::module(*parent, name.clone());
                    (
                        name.clone(),
                        PackageContainerGroup::new(module_location, roots.clone()),
                    )
                })
                .collect()
        })
    }
}

/// A [`FileManager`] whose every location lives in memory.
#[derive(Debug)]
pub struct InMemoryFileManager {
    release: String,
    state: RwLock<State>,
    closed: AtomicBool,
}

impl InMemoryFileManager {
    #[must_use]
    pub fn new(release: impl Into<String>) -> Self {
        Self {
            release: release.into(),
            state: RwLock::new(State::default()),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(FileManagerErrorKind::Closed.into());
        }
        Ok(())
    }
}

fn module_oriented(location: &Location) -> FileManagerError {
    FileManagerErrorKind::ModuleOrientedLocation {
        location: location.name(),
    }
    .into()
}

fn not_module_oriented(location: &Location) -> FileManagerError {
    FileManagerErrorKind::NotModuleOrientedLocation {
        location: location.name(),
    }
    .into()
}

fn not_output(location: &Location) -> FileManagerError {
    FileManagerErrorKind::NotOutputLocation {
        location: location.name(),
    }
    .into()
}

fn reject_module_oriented(location: &Location) -> Result<()> {
    if location.is_module_oriented_location() {
        return Err(module_oriented(location));
    }
    Ok(())
}

impl FileManager for InMemoryFileManager {
    fn add_container(&self, location: &Location, container: Arc<Container>) -> Result<()> {
        self.ensure_open()?;
        reject_module_oriented(location)?;
        let mut state = self.state.write();
        match location {
            Location::Standard(_) => state
                .packages
                .entry(location.clone())
                .or_default()
                .push(container),
            Location::Module(module) => state
                .modules
                .entry(Location::Standard(module.parent))
                .or_default()
                .entry(module.module_name.clone())
                .or_default()
                .push(container),
        }
        Ok(())
    }

    fn add_module_container(
        &self,
        location: &Location,
        module_name: &str,
        container: Arc<Container>,
    ) -> Result<()> {
        self.ensure_open()?;
        let accepts_modules = matches!(location, Location::Standard(_))
            && (location.is_module_oriented_location() || location.is_output_location());
        if !accepts_modules {
            return Err(not_module_oriented(location));
        }
        self.state
            .write()
            .modules
            .entry(location.clone())
            .or_default()
            .entry(module_name.to_string())
            .or_default()
            .push(container);
        Ok(())
    }

    fn create_empty_location(&self, location: &Location) -> Result<()> {
        self.ensure_open()?;
        let mut state = self.state.write();
        if location.is_module_oriented_location() {
            state.modules.entry(location.clone()).or_default();
            return Ok(());
        }
        let roots = match location {
            Location::Standard(_) => state.packages.entry(location.clone()).or_default(),
            Location::Module(module) => state
                .modules
                .entry(Location::Standard(module.parent))
                .or_default()
                .entry(module.module_name.clone())
                .or_default(),
        };
        if roots.is_empty() {
            roots.push(Arc::new(Container::new(location.name())));
        }
        Ok(())
    }

    fn has_location(&self, location: &Location) -> bool {
        let state = self.state.read();
        state.package_roots(location).is_some() || state.modules.contains_key(location)
    }

    fn contains(&self, location: &Location, path: &str) -> Result<bool> {
        self.ensure_open()?;
        let state = self.state.read();
        let in_roots = state
            .package_roots(location)
            .is_some_and(|roots| roots.iter().any(|root| root.contains(path)));
        let in_modules = state.modules.get(location).is_some_and(|modules| {
            modules
                .values()
                .flatten()
                .any(|root| root.contains(path))
        });
        Ok(in_roots || in_modules)
    }

    fn get_package_container_group(
        &self,
        location: &Location,
    ) -> Result<Option<PackageContainerGroup>> {
        self.ensure_open()?;
        reject_module_oriented(location)?;
        Ok(self.state.read().package_group(location))
    }

    fn get_module_container_group(
        &self,
        location: &Location,
    ) -> Result<Option<ModuleContainerGroup>> {
        self.ensure_open()?;
        if !location.is_module_oriented_location() && !location.is_output_location() {
            return Err(not_module_oriented(location));
        }
        Ok(self
            .state
            .read()
            .module_groups(location)
            .map(|modules| ModuleContainerGroup::new(location.clone(), modules)))
    }

    fn get_output_container_group(
        &self,
        location: &Location,
    ) -> Result<Option<OutputContainerGroup>> {
        self.ensure_open()?;
        if !location.is_output_location() {
            return Err(not_output(location));
        }
        let state = self.state.read();
        let package = state.package_group(location);
        let modules = state.module_groups(location);
        if package.is_none() && modules.is_none() {
            return Ok(None);
        }
        let package =
            package.unwrap_or_else(|| PackageContainerGroup::new(location.clone(), Vec::new()));
        Ok(Some(OutputContainerGroup::new(
            package,
            modules.unwrap_or_default(),
        )))
    }

    fn get_package_container_groups(&self) -> Result<Vec<PackageContainerGroup>> {
        self.ensure_open()?;
        let state = self.state.read();
        Ok(state
            .packages
            .iter()
            .map(|(location, roots)| PackageContainerGroup::new(location.clone(), roots.clone()))
            .collect())
    }

    fn list(
        &self,
        location: &Location,
        package_name: &str,
        kinds: &[FileKind],
        recurse: bool,
    ) -> Result<Vec<FileObject>> {
        self.ensure_open()?;
        reject_module_oriented(location)?;
        Ok(self
            .state
            .read()
            .package_group(location)
            .map(|group| group.list(package_name, kinds, recurse))
            .unwrap_or_default())
    }

    fn get_file_for_input(
        &self,
        location: &Location,
        package_name: &str,
        relative_name: &str,
    ) -> Result<Option<FileObject>> {
        self.ensure_open()?;
        reject_module_oriented(location)?;
        let path = resolve_in_package(package_name, relative_name);
        Ok(self
            .state
            .read()
            .package_group(location)
            .and_then(|group| group.get_file(&path)))
    }

    fn write_file(
        &self,
        location: &Location,
        package_name: &str,
        relative_name: &str,
        content: &[u8],
    ) -> Result<FileObject> {
        self.ensure_open()?;
        if !location.is_output_location() {
            return Err(not_output(location));
        }
        self.create_empty_location(location)?;

        let path = resolve_in_package(package_name, relative_name);
        let state = self.state.read();
        let root = state
            .package_roots(location)
            .and_then(|roots| roots.first())
            .ok_or_else(|| {
                FileManagerError::from(FileManagerErrorKind::LocationNotConfigured {
                    location: location.name(),
                })
            })?;
        root.write(&path, content);
        Ok(FileObject {
            location: location.clone(),
            container: root.name().to_string(),
            kind: FileKind::from_path(&path),
            path,
        })
    }

    fn read_file(&self, file: &FileObject) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let state = self.state.read();
        let roots = state.package_roots(&file.location).ok_or_else(|| {
            FileManagerError::from(FileManagerErrorKind::LocationNotConfigured {
                location: file.location.name(),
            })
        })?;
        roots
            .iter()
            .filter(|root| root.name() == file.container)
            .find_map(|root| root.read(&file.path))
            .ok_or_else(|| {
                FileManagerErrorKind::FileNotFound {
                    location: file.location.name(),
                    path: file.path.clone(),
                }
                .into()
            })
    }

    fn infer_binary_name(&self, location: &Location, file: &FileObject) -> Result<Option<String>> {
        self.ensure_open()?;
        if file.location != *location {
            return Ok(None);
        }
        let stem = file
            .path
            .rsplit_once('.')
            .map_or(file.path.as_str(), |(stem, _)| stem);
        Ok(Some(stem.replace('/', ".")))
    }

    fn effective_release(&self) -> String {
        self.release.clone()
    }

    fn flush(&self) -> Result<()> {
        self.ensure_open()
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl fmt::Display for InMemoryFileManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InMemoryFileManager{{release={}}}", self.release)
    }
}

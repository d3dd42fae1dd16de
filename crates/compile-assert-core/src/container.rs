//! In-memory containers and the groups that bundle them per location.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Kind of a file, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Source,
    Class,
    Html,
    Other,
}

impl FileKind {
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match path.rsplit_once('.').map(|(_, ext)| ext) {
            Some("java") => Self::Source,
            Some("class") => Self::Class,
            Some("html") => Self::Html,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Source => ".java",
            Self::Class => ".class",
            Self::Html => ".html",
            Self::Other => "",
        }
    }
}

/// Normalise a relative path: forward slashes, no leading `/` or `./`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Convert a dotted package name to its directory form.
#[must_use]
pub fn package_dir(package_name: &str) -> String {
    package_name
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a package directory and a relative name.
#[must_use]
pub fn resolve_in_package(package_name: &str, relative_name: &str) -> String {
    let dir = package_dir(package_name);
    let relative = normalize_path(relative_name);
    if dir.is_empty() {
        relative
    } else {
        format!("{dir}/{relative}")
    }
}

/// A named root holding files keyed by relative path.
pub struct Container {
    name: String,
    files: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl Container {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: RwLock::new(BTreeMap::new()),
        }
    }

    /// Builder-style file insertion.
    #[must_use]
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.write(path, content);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn write(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.files.write().insert(normalize_path(path), content.into());
    }

    #[must_use]
    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().get(&normalize_path(path)).cloned()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.read().contains_key(&normalize_path(path))
    }

    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.files.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// Paths directly inside `dir`, or anywhere below it when `recurse`.
    #[must_use]
    pub fn list(&self, dir: &str, recurse: bool) -> Vec<String> {
        let dir = normalize_path(dir);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        self.files
            .read()
            .keys()
            .filter(|path| path.starts_with(&prefix))
            .filter(|path| recurse || !path[prefix.len()..].contains('/'))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("files", &self.len())
            .finish()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A file resolved inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub location: Location,
    pub container: String,
    pub path: String,
    pub kind: FileKind,
}

impl fmt::Display for FileObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.location, self.container, self.path)
    }
}

/// Ordered containers for one package-oriented (or output) location.
#[derive(Debug, Clone)]
pub struct PackageContainerGroup {
    location: Location,
    containers: Vec<Arc<Container>>,
}

impl PackageContainerGroup {
    #[must_use]
    pub fn new(location: Location, containers: Vec<Arc<Container>>) -> Self {
        Self {
            location,
            containers,
        }
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn containers(&self) -> &[Arc<Container>] {
        &self.containers
    }

    /// First container holding `path`, searched in registration order.
    #[must_use]
    pub fn get_file(&self, path: &str) -> Option<FileObject> {
        let path = normalize_path(path);
        self.containers
            .iter()
            .find(|container| container.contains(&path))
            .map(|container| FileObject {
                location: self.location.clone(),
                container: container.name().to_string(),
                kind: FileKind::from_path(&path),
                path,
            })
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.containers
            .iter()
            .any(|container| container.contains(path))
    }

    #[must_use]
    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.containers
            .iter()
            .find_map(|container| container.read(path))
    }

    /// Files under `package_name`, filtered by kind. An empty `kinds` slice
    /// matches every kind.
    #[must_use]
    pub fn list(&self, package_name: &str, kinds: &[FileKind], recurse: bool) -> Vec<FileObject> {
        let dir = package_dir(package_name);
        self.containers
            .iter()
            .flat_map(|container| {
                container
                    .list(&dir, recurse)
                    .into_iter()
                    .map(move |path| FileObject {
                        location: self.location.clone(),
                        container: container.name().to_string(),
                        kind: FileKind::from_path(&path),
                        path,
                    })
            })
            .filter(|file| kinds.is_empty() || kinds.contains(&file.kind))
            .collect()
    }
}

/// Per-module package groups for one module-oriented location.
#[derive(Debug, Clone)]
pub struct ModuleContainerGroup {
    location: Location,
    modules: BTreeMap<String, PackageContainerGroup>,
}

impl ModuleContainerGroup {
    #[must_use]
    pub fn new(location: Location, modules: BTreeMap<String, PackageContainerGroup>) -> Self {
        Self { location, modules }
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn get_module(&self, module_name: &str) -> Option<&PackageContainerGroup> {
        self.modules.get(module_name)
    }

    #[must_use]
    pub fn modules(&self) -> &BTreeMap<String, PackageContainerGroup> {
        &self.modules
    }
}

/// An output location: its own roots plus per-module roots.
#[derive(Debug, Clone)]
pub struct OutputContainerGroup {
    package: PackageContainerGroup,
    modules: BTreeMap<String, PackageContainerGroup>,
}

impl OutputContainerGroup {
    #[must_use]
    pub fn new(
        package: PackageContainerGroup,
        modules: BTreeMap<String, PackageContainerGroup>,
    ) -> Self {
        Self { package, modules }
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        self.package.location()
    }

    #[must_use]
    pub fn as_package_group(&self) -> &PackageContainerGroup {
        &self.package
    }

    #[must_use]
    pub fn as_module_group(&self) -> ModuleContainerGroup {
        ModuleContainerGroup::new(self.package.location().clone(), self.modules.clone())
    }

    #[must_use]
    pub fn get_module(&self, module_name: &str) -> Option<&PackageContainerGroup> {
        self.modules.get(module_name)
    }

    #[must_use]
    pub fn modules(&self) -> &BTreeMap<String, PackageContainerGroup> {
        &self.modules
    }
}

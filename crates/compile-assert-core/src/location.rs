//! Abstract file-manager locations.
//!
//! A location names a category of roots the compiler reads from or writes to.
//! Every location is exactly one of package-oriented, module-oriented, or an
//! output location (which is addressable both ways).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StandardLocation {
    ClassOutput,
    SourceOutput,
    ClassPath,
    SourcePath,
    AnnotationProcessorPath,
    AnnotationProcessorModulePath,
    PlatformClassPath,
    NativeHeaderOutput,
    ModuleSourcePath,
    UpgradeModulePath,
    SystemModules,
    ModulePath,
    PatchModulePath,
}

impl StandardLocation {
    pub const ALL: [StandardLocation; 13] = [
        Self::ClassOutput,
        Self::SourceOutput,
        Self::ClassPath,
        Self::SourcePath,
        Self::AnnotationProcessorPath,
        Self::AnnotationProcessorModulePath,
        Self::PlatformClassPath,
        Self::NativeHeaderOutput,
        Self::ModuleSourcePath,
        Self::UpgradeModulePath,
        Self::SystemModules,
        Self::ModulePath,
        Self::PatchModulePath,
    ];

    /// Canonical upper-snake name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ClassOutput => "CLASS_OUTPUT",
            Self::SourceOutput => "SOURCE_OUTPUT",
            Self::ClassPath => "CLASS_PATH",
            Self::SourcePath => "SOURCE_PATH",
            Self::AnnotationProcessorPath => "ANNOTATION_PROCESSOR_PATH",
            Self::AnnotationProcessorModulePath => "ANNOTATION_PROCESSOR_MODULE_PATH",
            Self::PlatformClassPath => "PLATFORM_CLASS_PATH",
            Self::NativeHeaderOutput => "NATIVE_HEADER_OUTPUT",
            Self::ModuleSourcePath => "MODULE_SOURCE_PATH",
            Self::UpgradeModulePath => "UPGRADE_MODULE_PATH",
            Self::SystemModules => "SYSTEM_MODULES",
            Self::ModulePath => "MODULE_PATH",
            Self::PatchModulePath => "PATCH_MODULE_PATH",
        }
    }

    /// Parse a canonical name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|location| location.name().eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub const fn is_output_location(self) -> bool {
        matches!(
            self,
            Self::ClassOutput | Self::SourceOutput | Self::NativeHeaderOutput
        )
    }

    #[must_use]
    pub const fn is_module_oriented_location(self) -> bool {
        matches!(
            self,
            Self::AnnotationProcessorModulePath
                | Self::ModuleSourcePath
                | Self::UpgradeModulePath
                | Self::SystemModules
                | Self::ModulePath
                | Self::PatchModulePath
        )
    }
}

/// A single module inside a module-oriented or output location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleLocation {
    pub parent: StandardLocation,
    pub module_name: String,
}

/// Any location a file manager understands.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Location {
    Standard(StandardLocation),
    Module(ModuleLocation),
}

impl Location {
    #[must_use]
    pub fn module(parent: StandardLocation, module_name: impl Into<String>) -> Self {
        Self::Module(ModuleLocation {
            parent,
            module_name: module_name.into(),
        })
    }

    /// Human-readable name, e.g. `CLASS_OUTPUT` or `MODULE_PATH[org.example]`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Standard(location) => location.name().to_string(),
            Self::Module(module) => format!("{}[{}]", module.parent.name(), module.module_name),
        }
    }

    #[must_use]
    pub fn is_output_location(&self) -> bool {
        match self {
            Self::Standard(location) => location.is_output_location(),
            Self::Module(module) => module.parent.is_output_location(),
        }
    }

    /// Module locations are never module-oriented themselves.
    #[must_use]
    pub fn is_module_oriented_location(&self) -> bool {
        match self {
            Self::Standard(location) => location.is_module_oriented_location(),
            Self::Module(_) => false,
        }
    }
}

impl From<StandardLocation> for Location {
    fn from(location: StandardLocation) -> Self {
        Self::Standard(location)
    }
}

impl fmt::Display for StandardLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

//! File-manager error types.
//!
//! [`FileManagerError`] follows the shape of `std::io::Error`: a [`kind`] that
//! callers match on, plus any failures that were suppressed while this one was
//! being propagated.
//!
//! [`kind`]: FileManagerError::kind

use std::fmt;

use thiserror::Error;

/// Convenience alias used by every [`FileManager`](crate::FileManager) operation.
pub type Result<T, E = FileManagerError> = std::result::Result<T, E>;

/// Classification of a file-manager failure.
#[derive(Debug, Error)]
pub enum FileManagerErrorKind {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("location {location} is module-oriented")]
    ModuleOrientedLocation { location: String },
    #[error("location {location} is not module-oriented")]
    NotModuleOrientedLocation { location: String },
    #[error("location {location} is not an output location")]
    NotOutputLocation { location: String },
    #[error("location {location} has not been configured")]
    LocationNotConfigured { location: String },
    #[error("file {path} not found in {location}")]
    FileNotFound { location: String, path: String },
    #[error("file manager has been closed")]
    Closed,
    /// A failure raised while dispatching `operation` to an underlying
    /// implementation. `cause` holds the real failure when one is known.
    #[error("dispatch of `{operation}` failed")]
    Dispatch {
        operation: String,
        cause: Option<Box<FileManagerError>>,
    },
}

/// A file-manager failure with any suppressed context attached.
#[derive(Debug)]
pub struct FileManagerError {
    kind: FileManagerErrorKind,
    suppressed: Vec<FileManagerError>,
}

impl FileManagerError {
    #[must_use]
    pub fn new(kind: FileManagerErrorKind) -> Self {
        Self {
            kind,
            suppressed: Vec::new(),
        }
    }

    /// Build a dispatch failure wrapping `cause`.
    #[must_use]
    pub fn dispatch(operation: impl Into<String>, cause: Option<FileManagerError>) -> Self {
        Self::new(FileManagerErrorKind::Dispatch {
            operation: operation.into(),
            cause: cause.map(Box::new),
        })
    }

    #[must_use]
    pub fn kind(&self) -> &FileManagerErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn into_kind(self) -> FileManagerErrorKind {
        self.kind
    }

    /// Failures that were attached to this one while it propagated.
    #[must_use]
    pub fn suppressed(&self) -> &[FileManagerError] {
        &self.suppressed
    }

    pub fn add_suppressed(&mut self, other: FileManagerError) {
        self.suppressed.push(other);
    }

    #[must_use]
    pub fn is_dispatch(&self) -> bool {
        matches!(self.kind, FileManagerErrorKind::Dispatch { .. })
    }
}

impl fmt::Display for FileManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for suppressed in &self.suppressed {
            write!(f, " (suppressed: {suppressed})")?;
        }
        Ok(())
    }
}

impl std::error::Error for FileManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            FileManagerErrorKind::Io(err) => Some(err),
            FileManagerErrorKind::Dispatch {
                cause: Some(cause), ..
            } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<FileManagerErrorKind> for FileManagerError {
    fn from(kind: FileManagerErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<std::io::Error> for FileManagerError {
    fn from(err: std::io::Error) -> Self {
        Self::new(FileManagerErrorKind::Io(err))
    }
}

/// Failures that may wrap the real failure raised behind a dispatch layer.
pub trait DispatchFailure: Sized {
    /// Unwrap to the underlying cause.
    ///
    /// Returns `Ok(cause)` with `self` attached to the cause as suppressed
    /// context, or `Err(self)` when there is nothing to unwrap.
    fn into_cause(self) -> Result<Self, Self>;
}

impl DispatchFailure for FileManagerError {
    fn into_cause(self) -> Result<Self, Self> {
        let Self { kind, suppressed } = self;
        match kind {
            FileManagerErrorKind::Dispatch {
                operation,
                cause: Some(cause),
            } => {
                let mut cause = *cause;
                // The wrapper keeps its own identity but loses the cause it
                // handed over.
                cause.add_suppressed(Self {
                    kind: FileManagerErrorKind::Dispatch {
                        operation,
                        cause: None,
                    },
                    suppressed,
                });
                Ok(cause)
            }
            kind => Err(Self { kind, suppressed }),
        }
    }
}

/// Resolve any failure to the one that should be reported to callers.
#[must_use]
pub fn unwrap_dispatch_failure<E: DispatchFailure>(err: E) -> E {
    match err.into_cause() {
        Ok(cause) | Err(cause) => cause,
    }
}

//! Assertions on one file found in a container group.

use crate::failure::fail;

/// Fluent assertions on the content of a file.
#[derive(Debug, Clone)]
pub struct FileAssert {
    location: String,
    path: String,
    content: Vec<u8>,
}

impl FileAssert {
    #[must_use]
    pub fn new(location: impl Into<String>, path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            location: location.into(),
            path: path.into(),
            content,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// # Panics
    ///
    /// If the file content differs from `expected`.
    #[track_caller]
    pub fn has_content(&self, expected: impl AsRef<[u8]>) -> &Self {
        let expected = expected.as_ref();
        if self.content != expected {
            fail(format_args!(
                "Expected {}:{} to have content {:?}, but it was {:?}.",
                self.location,
                self.path,
                String::from_utf8_lossy(expected),
                String::from_utf8_lossy(&self.content)
            ));
        }
        self
    }

    /// # Panics
    ///
    /// If the file is not UTF-8 or does not contain `needle`.
    #[track_caller]
    pub fn contains_text(&self, needle: &str) -> &Self {
        let Ok(text) = std::str::from_utf8(&self.content) else {
            fail(format_args!(
                "Expected {}:{} to be UTF-8 text, but it was binary.",
                self.location, self.path
            ));
        };
        if !text.contains(needle) {
            fail(format_args!(
                "Expected {}:{} to contain {needle:?}.",
                self.location, self.path
            ));
        }
        self
    }

    /// # Panics
    ///
    /// If the file is empty.
    #[track_caller]
    pub fn is_not_empty(&self) -> &Self {
        if self.content.is_empty() {
            fail(format_args!(
                "Expected {}:{} to not be empty.",
                self.location, self.path
            ));
        }
        self
    }
}

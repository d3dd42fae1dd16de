//! Harness error type.

use compile_assert_core::FileManagerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown location {name:?}")]
    UnknownLocation { name: String },
    #[error("file manager: {0}")]
    FileManager(#[from] FileManagerError),
}

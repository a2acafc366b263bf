use std::path::PathBuf;
use thiserror::Error;

/// Top-level structure problem in an in-memory export document.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ShapeError {
    pub message: String,
}

impl ShapeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Failure converting one export file. Always names the file; the cause is the `source`.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed export {}", path.display())]
    Shape {
        path: PathBuf,
        #[source]
        source: ShapeError,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

use std::path::PathBuf;
use thiserror::Error;

use crate::traits::ProcessorState;

/// Structured error types for dataset preparation.
///
/// Each variant carries the path or operation that failed so callers can
/// report the problem without parsing error strings.
#[derive(Error, Debug)]
pub enum CoffeeLeafError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} does not exist: {path:?}")]
    NotFound { what: String, path: PathBuf },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("CSV error: {operation} failed for {path:?}")]
    Csv {
        path: PathBuf,
        operation: String,
        #[source]
        source: csv::Error,
    },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },

    #[error("Unknown data processor `{name}` (available: {available})")]
    UnknownProcessor { name: String, available: String },

    #[error("{operation} requires state {required}, processor is {current}")]
    InvalidState {
        operation: String,
        required: ProcessorState,
        current: ProcessorState,
    },
}

pub type Result<T> = std::result::Result<T, CoffeeLeafError>;

impl CoffeeLeafError {
    pub(crate) fn not_found(what: &str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what: what.to_string(),
            path: path.into(),
        }
    }

    pub(crate) fn file_system(
        path: impl Into<PathBuf>,
        operation: &str,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            path: path.into(),
            operation: operation.to_string(),
            source,
        }
    }

    pub(crate) fn image(
        path: impl Into<PathBuf>,
        operation: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ImageProcessing {
            path: path.into().display().to_string(),
            operation: operation.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, operation: &str, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            operation: operation.to_string(),
            source,
        }
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convert anyhow errors to configuration errors.
impl From<anyhow::Error> for CoffeeLeafError {
    fn from(err: anyhow::Error) -> Self {
        CoffeeLeafError::Configuration {
            message: err.to_string(),
        }
    }
}

/// Fallback for I/O errors raised without path context. Code that knows the
/// path should build `CoffeeLeafError::FileSystem` directly.
impl From<std::io::Error> for CoffeeLeafError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

impl From<image::ImageError> for CoffeeLeafError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

impl From<csv::Error> for CoffeeLeafError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            path: PathBuf::from("unknown"),
            operation: "csv".to_string(),
            source: err,
        }
    }
}

/// Directory walks keep the path of the entry that failed.
impl From<walkdir::Error> for CoffeeLeafError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("unknown"));
        Self::FileSystem {
            path,
            operation: "directory walk".to_string(),
            source: err.into(),
        }
    }
}

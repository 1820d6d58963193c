//! Error types for a2a-meson.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up or running a meson-field computation.
#[derive(Debug, Error)]
pub enum A2AError {
    /// Malformed channel configuration (momenta, operators, block sizes).
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A collection or field does not have the size the index space expects.
    #[error("size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The kernel was built for a different momentum/operator set than the index space.
    #[error("kernel mismatch for {what}: index space has {expected}, kernel has {actual}")]
    KernelMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Operator not supported by the kernel it was handed to.
    #[error("operator {operator} is not supported by the {kernel} kernel")]
    UnsupportedOperator {
        operator: String,
        kernel: &'static str,
    },

    /// Filesystem failure in an output sink.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Metadata or header (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A slice file could not be decoded.
    #[error("malformed slice file {path}: {message}")]
    Format { path: PathBuf, message: String },
}

impl A2AError {
    /// Shorthand for [`A2AError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, A2AError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_message() {
        let err = A2AError::SizeMismatch {
            what: "left vectors",
            expected: 4,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "size mismatch for left vectors: expected 4, got 3"
        );
    }

    #[test]
    fn test_io_keeps_path() {
        let err = A2AError::io(
            "/nowhere/slice.a2am",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/nowhere/slice.a2am"));
    }
}

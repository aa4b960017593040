//! Centralized error types for woof.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the woof library.
///
/// Only [`WoofError::OutputOpen`] (and argument errors handled by the CLI)
/// abort a digest run. Everything else is reported per input file.
#[derive(Error, Debug)]
pub enum WoofError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An input message file does not exist.
    #[error("No such file: {0}")]
    InputNotFound(PathBuf),

    /// The temporary output file could not be created.
    #[error("Cannot open output file '{path}': {source}")]
    OutputOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The finished temporary file could not be moved onto the output path.
    #[error("Cannot rename '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is unreadable or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias for `Result<T, WoofError>`.
pub type Result<T> = std::result::Result<T, WoofError>;

impl WoofError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify a failure to open an input file.
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::InputNotFound(path)
        } else {
            Self::io(path, source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_not_found_is_classified() {
        let err = WoofError::input(
            "missing.eml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, WoofError::InputNotFound(_)));
        assert_eq!(err.to_string(), "No such file: missing.eml");
    }

    #[test]
    fn test_other_input_errors_keep_path() {
        let err = WoofError::input(
            "locked.eml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("locked.eml"));
    }
}

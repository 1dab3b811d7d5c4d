//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Comparison library error
    #[error("{0}")]
    Shotdiff(#[from] shotdiff::ShotdiffError),
}

impl CliError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = CliError::invalid_argument("no such dir");
        assert_eq!(err.to_string(), "Invalid argument: no such dir");
    }

    #[test]
    fn test_library_error_passes_message_through() {
        let err: CliError = shotdiff::ShotdiffError::config("bad platform").into();
        assert_eq!(err.to_string(), "Configuration error: bad platform");
    }
}

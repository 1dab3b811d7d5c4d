//! Result and error types for shotdiff.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for shotdiff operations
pub type ShotdiffResult<T> = Result<T, ShotdiffError>;

/// Width and height of a raster image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// Errors that can occur in shotdiff
#[derive(Debug, Error)]
pub enum ShotdiffError {
    /// Caller passed something that cannot be compared
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Image could not be read or decoded
    #[error("Failed to load image {}: {message}", path.display())]
    ImageLoad {
        /// Path that failed to load
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Images differ in size after cropping
    #[error("Image dimensions differ: {first} vs {second}")]
    DimensionMismatch {
        /// Dimensions of the first image
        first: Dimensions,
        /// Dimensions of the second image
        second: Dimensions,
    },

    /// Header crop does not fit inside the image
    #[error("Cannot crop {header_height} header rows from an image {image_height} rows tall")]
    InvalidCrop {
        /// Requested header height
        header_height: u32,
        /// Height of the image being cropped
        image_height: u32,
    },

    /// Diff image could not be encoded
    #[error("Failed to encode image: {message}")]
    ImageEncode {
        /// Error message
        message: String,
    },

    /// Screenshot capture failed
    #[error("Screenshot capture failed: {message}")]
    Capture {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Background task failed to complete
    #[error("Background task failed: {message}")]
    Task {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShotdiffError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from the precondition check
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_display() {
        assert_eq!(Dimensions::new(100, 200).to_string(), "100x200");
    }

    #[test]
    fn test_dimensions_pixel_count_no_overflow() {
        let dims = Dimensions::new(u32::MAX, 2);
        assert_eq!(dims.pixel_count(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = ShotdiffError::DimensionMismatch {
            first: Dimensions::new(100, 100),
            second: Dimensions::new(100, 200),
        };
        let msg = err.to_string();
        assert!(msg.contains("100x100"));
        assert!(msg.contains("100x200"));
    }

    #[test]
    fn test_image_load_message_includes_path() {
        let err = ShotdiffError::ImageLoad {
            path: PathBuf::from("shots/home.png"),
            message: "No such file".to_string(),
        };
        assert!(err.to_string().contains("shots/home.png"));
    }

    #[test]
    fn test_is_invalid_argument() {
        assert!(ShotdiffError::invalid_argument("bad").is_invalid_argument());
        assert!(!ShotdiffError::config("bad").is_invalid_argument());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ShotdiffError = io.into();
        assert!(matches!(err, ShotdiffError::Io(_)));
    }
}

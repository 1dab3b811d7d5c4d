//! Header cropping for platform screenshots.
//!
//! Device screenshots usually carry a status bar or browser chrome at the
//! top that changes between captures (clock, battery, signal). Stripping it
//! before diffing keeps those rows from showing up as regressions.

use crate::result::{ShotdiffError, ShotdiffResult};
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// Rows to strip from the top of a screenshot before comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropConfig {
    /// Number of rows removed from the top of the image
    pub header_height: u32,
}

impl CropConfig {
    /// Create a crop config for the given header height
    #[must_use]
    pub const fn new(header_height: u32) -> Self {
        Self { header_height }
    }

    /// Whether this config leaves the image untouched
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.header_height == 0
    }
}

/// Remove the top `header_height` rows of `image`.
///
/// The width is unchanged. A header as tall as (or taller than) the image is
/// rejected rather than clamped, since it would leave nothing to compare.
///
/// # Errors
///
/// Returns [`ShotdiffError::InvalidCrop`] when `header_height >= image height`.
pub fn crop_header(image: &DynamicImage, config: &CropConfig) -> ShotdiffResult<DynamicImage> {
    let (width, height) = image.dimensions();

    if config.is_noop() {
        return Ok(image.clone());
    }

    if config.header_height >= height {
        return Err(ShotdiffError::InvalidCrop {
            header_height: config.header_height,
            image_height: height,
        });
    }

    tracing::debug!(
        header_height = config.header_height,
        width,
        height,
        "cropping header"
    );

    Ok(image.crop_imm(0, config.header_height, width, height - config.header_height))
}

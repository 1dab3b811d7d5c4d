//! Screenshot comparison.
//!
//! Errors travel on two separate channels:
//!
//! - **Precondition** (`compare` returns `Err` immediately): the inputs are
//!   not loadable paths or the threshold is out of range. Nothing has been
//!   read or spawned yet.
//! - **Asynchronous** (the returned future resolves to `Err`): load
//!   failures, invalid crops and dimension mismatches.
//!
//! ```no_run
//! # async fn run() -> shotdiff::ShotdiffResult<()> {
//! use shotdiff::{compare, CompareOptions, CropConfig};
//!
//! let options = CompareOptions::default().with_platform(CropConfig::new(44));
//! let result = compare("baseline/home.png", "new/home.png", &options)?.await?;
//! if result.are_different {
//!     result.save_result_image("diff/home.png")?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::crop::{crop_header, CropConfig};
use crate::pixel_diff::{diff_images, DiffOptions, DEFAULT_THRESHOLD};
use crate::result::{Dimensions, ShotdiffError, ShotdiffResult};
use futures::future::BoxFuture;
use image::{DynamicImage, GenericImageView, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reference to an image handed to the comparator
#[derive(Debug, Clone)]
pub enum ImageRef {
    /// Path to an image file on disk
    Path(PathBuf),
    /// An already decoded image; not accepted by [`compare`]
    Decoded(DynamicImage),
}

impl ImageRef {
    fn into_path(self, label: &str) -> ShotdiffResult<PathBuf> {
        match self {
            Self::Path(path) if path.as_os_str().is_empty() => Err(
                ShotdiffError::invalid_argument(format!("{label} image path is empty")),
            ),
            Self::Path(path) => Ok(path),
            Self::Decoded(img) => {
                let (w, h) = img.dimensions();
                Err(ShotdiffError::invalid_argument(format!(
                    "{label} image must be a file path, got a decoded {w}x{h} image"
                )))
            }
        }
    }
}

impl From<&str> for ImageRef {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for ImageRef {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<&Path> for ImageRef {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ImageRef {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&PathBuf> for ImageRef {
    fn from(path: &PathBuf) -> Self {
        Self::Path(path.clone())
    }
}

impl From<DynamicImage> for ImageRef {
    fn from(img: DynamicImage) -> Self {
        Self::Decoded(img)
    }
}

impl From<RgbaImage> for ImageRef {
    fn from(img: RgbaImage) -> Self {
        Self::Decoded(DynamicImage::ImageRgba8(img))
    }
}

/// Options for a single comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Diff sensitivity in [0, 1]
    pub threshold: f64,
    /// Count anti-aliased edge pixels as differences
    pub include_anti_aliasing: bool,
    /// Header crop applied to both images before comparing
    pub platform: Option<CropConfig>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            include_anti_aliasing: false,
            platform: None,
        }
    }
}

impl CompareOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the threshold
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Crop both images with this config
    #[must_use]
    pub const fn with_platform(mut self, platform: CropConfig) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Count anti-aliased pixels as differences
    #[must_use]
    pub const fn with_include_anti_aliasing(mut self, include: bool) -> Self {
        self.include_anti_aliasing = include;
        self
    }

    /// Pixel diff options derived from these settings
    #[must_use]
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions::default()
            .with_threshold(self.threshold)
            .with_include_anti_aliasing(self.include_anti_aliasing)
    }

    /// Check the threshold is a finite value in [0, 1]
    ///
    /// # Errors
    ///
    /// Returns [`ShotdiffError::InvalidArgument`] otherwise.
    pub fn validate(&self) -> ShotdiffResult<()> {
        if self.threshold.is_finite() && (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(ShotdiffError::invalid_argument(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )))
        }
    }
}

/// Outcome of comparing two screenshots
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    /// Diff visualization, same size as the (cropped) inputs
    pub result_image: RgbaImage,
    /// True iff at least one pixel differs
    pub are_different: bool,
    /// Fraction of differing pixels in [0, 1]
    pub diff_ratio: f64,
    /// Number of differing pixels
    pub diff_pixel_count: u64,
    /// Size of the compared area
    pub dimensions: Dimensions,
}

/// Serializable summary of a comparison, without the diff image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// True iff at least one pixel differs
    pub are_different: bool,
    /// Fraction of differing pixels in [0, 1]
    pub diff_ratio: f64,
    /// Number of differing pixels
    pub diff_pixel_count: u64,
    /// Compared width
    pub width: u32,
    /// Compared height
    pub height: u32,
}

impl ComparisonSummary {
    /// Render as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> ShotdiffResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ComparisonResult {
    /// Summary without the diff image
    #[must_use]
    pub const fn summary(&self) -> ComparisonSummary {
        ComparisonSummary {
            are_different: self.are_different,
            diff_ratio: self.diff_ratio,
            diff_pixel_count: self.diff_pixel_count,
            width: self.dimensions.width,
            height: self.dimensions.height,
        }
    }

    /// Difference as a percentage (0.0-100.0)
    #[must_use]
    pub fn diff_percentage(&self) -> f64 {
        self.diff_ratio * 100.0
    }

    /// Encode the diff image as PNG
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails
    pub fn to_png_bytes(&self) -> ShotdiffResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
        encoder
            .write_image(
                self.result_image.as_raw(),
                self.dimensions.width,
                self.dimensions.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| ShotdiffError::ImageEncode {
                message: format!("Failed to encode diff image: {e}"),
            })?;
        Ok(buffer)
    }

    /// Write the diff image to `path` as PNG
    ///
    /// # Errors
    ///
    /// Returns error if encoding or writing fails
    pub fn save_result_image(&self, path: impl AsRef<Path>) -> ShotdiffResult<()> {
        let bytes = self.to_png_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Future returned by [`compare`]
pub type ComparisonFuture = BoxFuture<'static, ShotdiffResult<ComparisonResult>>;

/// Compare the images at two paths.
///
/// Both references are validated before anything is loaded. The returned
/// future loads the two files concurrently, applies the platform crop,
/// checks dimensions and runs the pixel diff. It must be polled inside a
/// tokio runtime.
///
/// # Errors
///
/// Returns [`ShotdiffError::InvalidArgument`] synchronously if either
/// reference is not a non-empty path or the threshold is invalid.
pub fn compare(
    first: impl Into<ImageRef>,
    second: impl Into<ImageRef>,
    options: &CompareOptions,
) -> ShotdiffResult<ComparisonFuture> {
    let first = first.into().into_path("first")?;
    let second = second.into().into_path("second")?;
    options.validate()?;

    let options = options.clone();
    Ok(Box::pin(async move {
        tracing::debug!(first = %first.display(), second = %second.display(), "loading images");
        let (img_a, img_b) = futures::future::try_join(load_image(first), load_image(second)).await?;

        tokio::task::spawn_blocking(move || compare_decoded(&img_a, &img_b, &options))
            .await
            .map_err(|e| ShotdiffError::Task {
                message: e.to_string(),
            })?
    }))
}

/// Compare two paths, flattening both error channels into one `Result`.
///
/// # Errors
///
/// Returns any precondition, load, crop or dimension error.
pub async fn compare_paths(
    first: impl Into<ImageRef>,
    second: impl Into<ImageRef>,
    options: &CompareOptions,
) -> ShotdiffResult<ComparisonResult> {
    compare(first, second, options)?.await
}

/// Crop, validate and diff two already decoded images.
///
/// # Errors
///
/// Returns [`ShotdiffError::InvalidCrop`] or [`ShotdiffError::DimensionMismatch`].
pub fn compare_decoded(
    first: &DynamicImage,
    second: &DynamicImage,
    options: &CompareOptions,
) -> ShotdiffResult<ComparisonResult> {
    let (first, second) = match &options.platform {
        Some(crop) => (crop_header(first, crop)?, crop_header(second, crop)?),
        None => (first.clone(), second.clone()),
    };

    let dims_a = Dimensions::from(first.dimensions());
    let dims_b = Dimensions::from(second.dimensions());
    if dims_a != dims_b {
        tracing::warn!(first = %dims_a, second = %dims_b, "dimension mismatch");
        return Err(ShotdiffError::DimensionMismatch {
            first: dims_a,
            second: dims_b,
        });
    }

    let diff = diff_images(&first.to_rgba8(), &second.to_rgba8(), &options.diff_options())?;
    let diff_ratio = diff.ratio();
    let are_different = diff_ratio > 0.0;

    tracing::info!(
        dimensions = %dims_a,
        diff_pixels = diff.diff_pixel_count,
        diff_ratio,
        are_different,
        "comparison complete"
    );

    Ok(ComparisonResult {
        result_image: diff.diff_image,
        are_different,
        diff_ratio,
        diff_pixel_count: diff.diff_pixel_count,
        dimensions: dims_a,
    })
}

/// Comparator holding a default set of options
#[derive(Debug, Clone, Default)]
pub struct ScreenshotComparator {
    options: CompareOptions,
}

impl ScreenshotComparator {
    /// Create a comparator with the given defaults
    #[must_use]
    pub const fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    /// Compare two images with this comparator's options
    ///
    /// # Errors
    ///
    /// See [`compare`].
    pub fn compare(
        &self,
        first: impl Into<ImageRef>,
        second: impl Into<ImageRef>,
    ) -> ShotdiffResult<ComparisonFuture> {
        compare(first, second, &self.options)
    }

    /// Get options
    #[must_use]
    pub const fn options(&self) -> &CompareOptions {
        &self.options
    }
}

async fn load_image(path: PathBuf) -> ShotdiffResult<DynamicImage> {
    let task_path = path.clone();
    let loaded = tokio::task::spawn_blocking(move || image::open(&task_path))
        .await
        .map_err(|e| ShotdiffError::Task {
            message: e.to_string(),
        })?;

    loaded.map_err(|e| ShotdiffError::ImageLoad {
        path,
        message: e.to_string(),
    })
}

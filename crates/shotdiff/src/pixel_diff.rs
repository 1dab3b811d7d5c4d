//! Perceptual pixel diff.
//!
//! Colors are compared in YIQ space, which tracks perceived brightness and
//! chroma better than raw RGB distance. Pixels that differ only because of
//! anti-aliasing along edges can be detected and excluded from the count.
//!
//! ## Algorithm
//!
//! ```text
//! for every pixel p:
//!     delta = yiq_delta(a[p], b[p])
//!     if |delta| <= MAX_YIQ_DELTA * threshold^2  -> faded grayscale
//!     elif anti-aliased in a or b (and AA ignored) -> aa_color
//!     else                                       -> diff_color, count++
//! ```

use crate::result::{Dimensions, ShotdiffError, ShotdiffResult};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Upper bound of the weighted YIQ distance between two opaque colors
pub const MAX_YIQ_DELTA: f64 = 35215.0;

/// Default sensitivity threshold
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Options controlling the pixel diff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Sensitivity in [0, 1]; lower flags smaller color changes
    pub threshold: f64,
    /// Count anti-aliased pixels as differences
    pub include_anti_aliasing: bool,
    /// Opacity of unchanged pixels in the diff image
    pub alpha: f64,
    /// Color used for anti-aliased pixels
    pub aa_color: [u8; 3],
    /// Color used for differing pixels
    pub diff_color: [u8; 3],
    /// Color for differing pixels where the first image is lighter
    pub diff_color_alt: Option<[u8; 3]>,
    /// Render unchanged pixels transparent instead of faded
    pub diff_mask: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            include_anti_aliasing: false,
            alpha: 0.1,
            aa_color: [255, 255, 0],
            diff_color: [255, 0, 0],
            diff_color_alt: None,
            diff_mask: false,
        }
    }
}

impl DiffOptions {
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

    /// Count anti-aliased pixels as differences
    #[must_use]
    pub const fn with_include_anti_aliasing(mut self, include: bool) -> Self {
        self.include_anti_aliasing = include;
        self
    }

    /// Render unchanged pixels transparent
    #[must_use]
    pub const fn with_diff_mask(mut self, mask: bool) -> Self {
        self.diff_mask = mask;
        self
    }

    /// Squared YIQ distance above which a pixel counts as different
    #[must_use]
    pub fn max_delta(&self) -> f64 {
        MAX_YIQ_DELTA * self.threshold * self.threshold
    }
}

/// Output of [`diff_images`]
#[derive(Debug, Clone)]
pub struct PixelDiff {
    /// Visualization of the differences, same size as the inputs
    pub diff_image: RgbaImage,
    /// Pixels classified as different
    pub diff_pixel_count: u64,
    /// Pixels classified as anti-aliasing and skipped
    pub aa_pixel_count: u64,
    /// Total pixels compared
    pub total_pixels: u64,
}

impl PixelDiff {
    /// Fraction of differing pixels in [0, 1]
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.diff_pixel_count as f64 / self.total_pixels as f64
        }
    }

    /// Whether no pixel was classified as different
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        self.diff_pixel_count == 0
    }
}

/// Compare two equally sized images pixel by pixel.
///
/// # Errors
///
/// Returns [`ShotdiffError::DimensionMismatch`] when the images differ in size.
pub fn diff_images(
    first: &RgbaImage,
    second: &RgbaImage,
    options: &DiffOptions,
) -> ShotdiffResult<PixelDiff> {
    let dims_a = Dimensions::from(first.dimensions());
    let dims_b = Dimensions::from(second.dimensions());
    if dims_a != dims_b {
        return Err(ShotdiffError::DimensionMismatch {
            first: dims_a,
            second: dims_b,
        });
    }

    let (width, height) = first.dimensions();
    let total_pixels = dims_a.pixel_count();
    let mut output = RgbaImage::new(width, height);

    if first.as_raw() == second.as_raw() {
        if !options.diff_mask {
            for (x, y, px) in first.enumerate_pixels() {
                output.put_pixel(x, y, gray_pixel(*px, options.alpha));
            }
        }
        return Ok(PixelDiff {
            diff_image: output,
            diff_pixel_count: 0,
            aa_pixel_count: 0,
            total_pixels,
        });
    }

    let max_delta = options.max_delta();
    let mut diff_pixel_count = 0u64;
    let mut aa_pixel_count = 0u64;

    for y in 0..height {
        for x in 0..width {
            let pa = *first.get_pixel(x, y);
            let pb = *second.get_pixel(x, y);
            let delta = color_delta(pa, pb, false);

            if delta.abs() > max_delta {
                if !options.include_anti_aliasing
                    && (antialiased(first, x, y, second) || antialiased(second, x, y, first))
                {
                    aa_pixel_count += 1;
                    if !options.diff_mask {
                        output.put_pixel(x, y, solid(options.aa_color));
                    }
                } else {
                    diff_pixel_count += 1;
                    let color = match options.diff_color_alt {
                        Some(alt) if delta < 0.0 => alt,
                        _ => options.diff_color,
                    };
                    output.put_pixel(x, y, solid(color));
                }
            } else if !options.diff_mask {
                output.put_pixel(x, y, gray_pixel(pa, options.alpha));
            }
        }
    }

    tracing::debug!(
        width,
        height,
        diff_pixel_count,
        aa_pixel_count,
        threshold = options.threshold,
        "pixel diff complete"
    );

    Ok(PixelDiff {
        diff_image: output,
        diff_pixel_count,
        aa_pixel_count,
        total_pixels,
    })
}

/// Signed squared YIQ distance; negative when `a` is lighter than `b`.
///
/// With `y_only` only the brightness difference is returned.
fn color_delta(a: Rgba<u8>, b: Rgba<u8>, y_only: bool) -> f64 {
    if a == b {
        return 0.0;
    }

    let (r1, g1, b1) = blend_over_white(a);
    let (r2, g2, b2) = blend_over_white(b);

    let y1 = rgb_to_y(r1, g1, b1);
    let y2 = rgb_to_y(r2, g2, b2);
    let dy = y1 - y2;

    if y_only {
        return dy;
    }

    let di = rgb_to_i(r1, g1, b1) - rgb_to_i(r2, g2, b2);
    let dq = rgb_to_q(r1, g1, b1) - rgb_to_q(r2, g2, b2);
    let delta = 0.5053 * dy * dy + 0.299 * di * di + 0.1957 * dq * dq;

    if y1 > y2 {
        -delta
    } else {
        delta
    }
}

fn blend_over_white(px: Rgba<u8>) -> (f64, f64, f64) {
    let Rgba([r, g, b, a]) = px;
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    if a == 255 {
        return (r, g, b);
    }
    let alpha = f64::from(a) / 255.0;
    (blend(r, alpha), blend(g, alpha), blend(b, alpha))
}

fn blend(channel: f64, alpha: f64) -> f64 {
    255.0 + (channel - 255.0) * alpha
}

fn rgb_to_y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.298_895_31 + g * 0.586_622_47 + b * 0.114_482_23
}

fn rgb_to_i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.595_977_99 - g * 0.274_176_10 - b * 0.321_801_89
}

fn rgb_to_q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.211_470_17 - g * 0.522_617_11 + b * 0.311_146_94
}

/// Bounds of the 3x3 neighbourhood around (x, y), clamped to the image
const fn neighbourhood(x: u32, y: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let x0 = x.saturating_sub(1);
    let y0 = y.saturating_sub(1);
    let x2 = if x + 1 < width { x + 1 } else { width - 1 };
    let y2 = if y + 1 < height { y + 1 } else { height - 1 };
    (x0, y0, x2, y2)
}

/// Whether the pixel at (x, y) in `img` looks like an anti-aliased edge.
///
/// An anti-aliased pixel sits between a darker and a brighter neighbour and
/// has few same-brightness neighbours. At least one of those extreme
/// neighbours must lie in a flat region in both images.
fn antialiased(img: &RgbaImage, x: u32, y: u32, other: &RgbaImage) -> bool {
    let (width, height) = img.dimensions();
    let (x0, y0, x2, y2) = neighbourhood(x, y, width, height);
    let center = *img.get_pixel(x, y);

    let mut zeroes = u32::from(x == x0 || x == x2 || y == y0 || y == y2);
    let mut min = 0.0;
    let mut max = 0.0;
    let mut min_at = None;
    let mut max_at = None;

    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }
            let delta = color_delta(center, *img.get_pixel(nx, ny), true);
            if delta == 0.0 {
                zeroes += 1;
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_at = Some((nx, ny));
            } else if delta > max {
                max = delta;
                max_at = Some((nx, ny));
            }
        }
    }

    let (Some((min_x, min_y)), Some((max_x, max_y))) = (min_at, max_at) else {
        return false;
    };

    (has_many_siblings(img, min_x, min_y) && has_many_siblings(other, min_x, min_y))
        || (has_many_siblings(img, max_x, max_y) && has_many_siblings(other, max_x, max_y))
}

/// Whether the pixel at (x, y) has more than two identical neighbours
fn has_many_siblings(img: &RgbaImage, x: u32, y: u32) -> bool {
    let (width, height) = img.dimensions();
    let (x0, y0, x2, y2) = neighbourhood(x, y, width, height);
    let center = img.get_pixel(x, y);

    let mut zeroes = u32::from(x == x0 || x == x2 || y == y0 || y == y2);
    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }
            if img.get_pixel(nx, ny) == center {
                zeroes += 1;
            }
            if zeroes > 2 {
                return true;
            }
        }
    }
    false
}

const fn solid([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Unchanged pixel rendered as faded grayscale
fn gray_pixel(px: Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let Rgba([r, g, b, a]) = px;
    let luma = rgb_to_y(f64::from(r), f64::from(g), f64::from(b));
    let value = blend(luma, alpha * f64::from(a) / 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([value, value, value, 255])
}

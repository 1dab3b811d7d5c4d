//! shotdiff: screenshot comparison for visual regression tests
//!
//! Compares a baseline capture against a new one, optionally stripping a
//! platform header (status bar, browser chrome) first, and reports whether
//! any pixel changed perceptibly.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ ImageRef x2  │──►│ load (async, │──►│ crop_header  │──►│ diff_images  │
//! │ (paths)      │   │ concurrent)  │   │ (optional)   │   │ (YIQ + AA)   │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────┬───────┘
//!        │                                                        ▼
//!  InvalidArgument                                       ComparisonResult
//!  (synchronous)                                  { result_image, are_different }
//! ```
//!
//! The [`harness`] module wires the comparator to an injected
//! [`ScreenshotDriver`] for baseline-style checks.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod comparator;
pub mod config;
pub mod crop;
pub mod harness;
pub mod pixel_diff;
mod result;

pub use comparator::{
    compare, compare_decoded, compare_paths, CompareOptions, ComparisonFuture, ComparisonResult,
    ComparisonSummary, ImageRef, ScreenshotComparator,
};
pub use config::ShotdiffConfig;
pub use crop::{crop_header, CropConfig};
pub use harness::{
    CheckOutcome, FailureLog, MockDriver, ScreenshotDriver, Viewport, VisualCheck,
};
pub use pixel_diff::{diff_images, DiffOptions, PixelDiff, DEFAULT_THRESHOLD, MAX_YIQ_DELTA};
pub use result::{Dimensions, ShotdiffError, ShotdiffResult};

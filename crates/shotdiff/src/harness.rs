//! Baseline checks driven by an injected screenshot driver.
//!
//! The browser session and the failure log are passed in explicitly; nothing
//! here reaches for global state. A check captures a fresh screenshot,
//! promotes it to baseline on first run, and otherwise diffs it against the
//! stored baseline.
//!
//! ```text
//! driver.viewport_size()  ->  "{name}_{w}x{h}.png"
//! driver.capture_to(new_dir/...)
//!   baseline missing  -> copy to baseline_dir          BaselineCreated
//!   compare           -> equal                         Passed
//!                     -> different, write diff_dir/... Regression
//!                     -> error, append to failure log  Err
//! ```

use crate::comparator::compare;
use crate::config::ShotdiffConfig;
use crate::result::{ShotdiffError, ShotdiffResult};
use async_trait::async_trait;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Browser viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The slice of a browser session that visual checks need
#[async_trait]
pub trait ScreenshotDriver: Send + Sync {
    /// Capture the current page to a PNG file at `path`
    async fn capture_to(&mut self, path: &Path) -> ShotdiffResult<()>;

    /// Current viewport size
    async fn viewport_size(&self) -> ShotdiffResult<Viewport>;
}

/// Driver that writes a preset frame, for tests and dry runs
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Frame written on capture
    pub frame: Option<RgbaImage>,
    /// Reported viewport
    pub viewport: Viewport,
    /// Call history for verification
    pub call_history: Vec<String>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self {
            frame: None,
            viewport: Viewport::new(1280, 720),
            call_history: Vec::new(),
        }
    }
}

impl MockDriver {
    /// Create a mock driver with no frame
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock driver returning `frame`, sized to match
    #[must_use]
    pub fn with_frame(frame: RgbaImage) -> Self {
        let (width, height) = frame.dimensions();
        Self {
            frame: Some(frame),
            viewport: Viewport::new(width, height),
            call_history: Vec::new(),
        }
    }

    /// Replace the frame written on the next capture
    pub fn set_frame(&mut self, frame: RgbaImage) {
        self.frame = Some(frame);
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }
}

#[async_trait]
impl ScreenshotDriver for MockDriver {
    async fn capture_to(&mut self, path: &Path) -> ShotdiffResult<()> {
        self.call_history.push(format!("capture_to:{}", path.display()));
        let frame = self.frame.as_ref().ok_or_else(|| ShotdiffError::Capture {
            message: "No mock frame set".to_string(),
        })?;
        frame.save(path).map_err(|e| ShotdiffError::Capture {
            message: e.to_string(),
        })
    }

    async fn viewport_size(&self) -> ShotdiffResult<Viewport> {
        Ok(self.viewport)
    }
}

/// Append-only log of failed visual checks.
///
/// Clones share the same lock, so lines from concurrent checks never interleave.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FailureLog {
    /// Log to the file at `path`, created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or written
    pub fn append(&self, line: &str) -> ShotdiffResult<()> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        writeln!(file, "{timestamp} {line}")?;
        Ok(())
    }

    /// Read all logged lines
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read
    pub fn lines(&self) -> ShotdiffResult<Vec<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Result of a single visual check
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// No baseline existed; the capture became the baseline
    BaselineCreated {
        /// Path of the new baseline
        baseline: PathBuf,
    },
    /// Capture matches the baseline
    Passed,
    /// Capture differs from the baseline
    Regression {
        /// Where the diff image was written
        diff_path: PathBuf,
        /// Fraction of differing pixels
        diff_ratio: f64,
    },
}

impl CheckOutcome {
    /// Whether the check should fail the test
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Regression { .. })
    }
}

/// Runs baseline checks using directories from [`ShotdiffConfig`]
#[derive(Debug, Clone, Default)]
pub struct VisualCheck {
    config: ShotdiffConfig,
}

impl VisualCheck {
    /// Create a check runner
    #[must_use]
    pub const fn new(config: ShotdiffConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ShotdiffConfig {
        &self.config
    }

    /// File name for a capture of `name` at `viewport`
    #[must_use]
    pub fn file_name(name: &str, viewport: Viewport) -> String {
        format!("{name}_{viewport}.png")
    }

    /// Capture `name` with `driver` and compare it against its baseline.
    ///
    /// # Errors
    ///
    /// Returns error if the name is invalid, capture fails, or the
    /// comparison fails. Comparison failures are also appended to `log`.
    pub async fn run<D>(
        &self,
        driver: &mut D,
        name: &str,
        platform: Option<&str>,
        log: &FailureLog,
    ) -> ShotdiffResult<CheckOutcome>
    where
        D: ScreenshotDriver + ?Sized,
    {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ShotdiffError::invalid_argument(format!(
                "check name must be a plain file stem, got '{name}'"
            )));
        }
        let options = self.config.compare_options(platform)?;

        let viewport = driver.viewport_size().await?;
        let file_name = Self::file_name(name, viewport);
        let baseline = self.config.baseline_dir.join(&file_name);
        let capture = self.config.new_dir.join(&file_name);

        tokio::fs::create_dir_all(&self.config.new_dir).await?;
        driver.capture_to(&capture).await?;

        if !tokio::fs::try_exists(&baseline).await? {
            tokio::fs::create_dir_all(&self.config.baseline_dir).await?;
            tokio::fs::copy(&capture, &baseline).await?;
            tracing::info!(check = name, baseline = %baseline.display(), "baseline created");
            return Ok(CheckOutcome::BaselineCreated { baseline });
        }

        let result = match compare(&baseline, &capture, &options)?.await {
            Ok(result) => result,
            Err(e) => {
                record_failure(log, format!("{name} [{viewport}] error: {e}")).await;
                return Err(e);
            }
        };

        if !result.are_different {
            tracing::debug!(check = name, %viewport, "visual check passed");
            return Ok(CheckOutcome::Passed);
        }

        tokio::fs::create_dir_all(&self.config.diff_dir).await?;
        let diff_path = self.config.diff_dir.join(&file_name);
        tokio::fs::write(&diff_path, result.to_png_bytes()?).await?;

        tracing::warn!(
            check = name,
            %viewport,
            diff_percentage = result.diff_percentage(),
            diff = %diff_path.display(),
            "visual regression"
        );
        record_failure(
            log,
            format!(
                "{name} [{viewport}] differs by {:.4}% ({} pixels), diff: {}",
                result.diff_percentage(),
                result.diff_pixel_count,
                diff_path.display()
            ),
        )
        .await;

        Ok(CheckOutcome::Regression {
            diff_path,
            diff_ratio: result.diff_ratio,
        })
    }
}

/// Append `line` on the blocking pool. A log write failure is reported
/// but never replaces the check's own result.
async fn record_failure(log: &FailureLog, line: String) {
    let task_log = log.clone();
    match tokio::task::spawn_blocking(move || task_log.append(&line)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(path = %log.path().display(), error = %e, "could not write failure log");
        }
        Err(e) => tracing::warn!(error = %e, "failure log task did not complete"),
    }
}

//! Configuration file support.
//!
//! ```yaml
//! threshold: 0.1
//! include_anti_aliasing: false
//! platforms:
//!   ios:
//!     header_height: 88
//!   android:
//!     header_height: 72
//! baseline_dir: __baselines__
//! new_dir: __new__
//! diff_dir: __diffs__
//! failure_log: visual-failures.log
//! ```

use crate::comparator::CompareOptions;
use crate::crop::CropConfig;
use crate::pixel_diff::DEFAULT_THRESHOLD;
use crate::result::{ShotdiffError, ShotdiffResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Project-level settings for screenshot comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotdiffConfig {
    /// Default diff sensitivity in [0, 1]
    pub threshold: f64,
    /// Count anti-aliased edge pixels as differences
    pub include_anti_aliasing: bool,
    /// Named header crops, keyed by platform
    pub platforms: BTreeMap<String, CropConfig>,
    /// Directory holding accepted screenshots
    pub baseline_dir: PathBuf,
    /// Directory new captures are written to
    pub new_dir: PathBuf,
    /// Directory diff images are written to
    pub diff_dir: PathBuf,
    /// Append-only log of failed comparisons
    pub failure_log: PathBuf,
}

impl Default for ShotdiffConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            include_anti_aliasing: false,
            platforms: BTreeMap::new(),
            baseline_dir: PathBuf::from("__baselines__"),
            new_dir: PathBuf::from("__new__"),
            diff_dir: PathBuf::from("__diffs__"),
            failure_log: PathBuf::from("visual-failures.log"),
        }
    }
}

impl ShotdiffConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from YAML
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or the values are invalid
    pub fn from_yaml_str(yaml: &str) -> ShotdiffResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> ShotdiffResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::from_yaml_str(&contents)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ShotdiffResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check values are usable
    ///
    /// # Errors
    ///
    /// Returns [`ShotdiffError::Config`] for an out-of-range threshold
    pub fn validate(&self) -> ShotdiffResult<()> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ShotdiffError::config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Set the threshold
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Register a named platform crop
    #[must_use]
    pub fn with_platform(mut self, name: impl Into<String>, crop: CropConfig) -> Self {
        self.platforms.insert(name.into(), crop);
        self
    }

    /// Set the baseline directory
    #[must_use]
    pub fn with_baseline_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.baseline_dir = dir.into();
        self
    }

    /// Set the capture directory
    #[must_use]
    pub fn with_new_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.new_dir = dir.into();
        self
    }

    /// Set the diff directory
    #[must_use]
    pub fn with_diff_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diff_dir = dir.into();
        self
    }

    /// Set the failure log path
    #[must_use]
    pub fn with_failure_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.failure_log = path.into();
        self
    }

    /// Look up a platform crop by name
    #[must_use]
    pub fn platform(&self, name: &str) -> Option<CropConfig> {
        self.platforms.get(name).copied()
    }

    /// Build comparison options, optionally for a named platform
    ///
    /// # Errors
    ///
    /// Returns [`ShotdiffError::Config`] if the platform is not defined
    pub fn compare_options(&self, platform: Option<&str>) -> ShotdiffResult<CompareOptions> {
        let mut options = CompareOptions::default()
            .with_threshold(self.threshold)
            .with_include_anti_aliasing(self.include_anti_aliasing);

        if let Some(name) = platform {
            let crop = self.platform(name).ok_or_else(|| {
                let known: Vec<&str> = self.platforms.keys().map(String::as_str).collect();
                ShotdiffError::config(format!(
                    "unknown platform '{name}' (known: {})",
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                ))
            })?;
            options = options.with_platform(crop);
        }

        Ok(options)
    }
}

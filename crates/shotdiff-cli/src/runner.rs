//! Command execution

use crate::commands::{CompareArgs, CompareDirArgs, DiffArgs, OutputFormatArg};
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use serde::Serialize;
use shotdiff::{compare, CompareOptions, ComparisonSummary, CropConfig, ShotdiffConfig};
use std::path::Path;
use std::time::Instant;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "shotdiff.yaml";

/// Load the config file, falling back to `shotdiff.yaml` and then defaults
pub fn load_config(path: Option<&Path>) -> CliResult<ShotdiffConfig> {
    match path {
        Some(path) => Ok(ShotdiffConfig::load(path)?),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            Ok(ShotdiffConfig::load(DEFAULT_CONFIG_FILE)?)
        }
        None => Ok(ShotdiffConfig::default()),
    }
}

/// Merge command-line overrides into the configured options
pub fn resolve_options(config: &ShotdiffConfig, args: &DiffArgs) -> CliResult<CompareOptions> {
    let mut options = config.compare_options(args.platform.as_deref())?;

    if let Some(threshold) = args.threshold {
        options = options.with_threshold(threshold);
    }
    if let Some(header_height) = args.header_height {
        options = options.with_platform(CropConfig::new(header_height));
    }
    if args.include_aa {
        options = options.with_include_anti_aliasing(true);
    }

    options.validate()?;
    Ok(options)
}

/// Compare two files. Returns whether they differ.
pub async fn run_compare(
    reporter: &Reporter,
    config: &ShotdiffConfig,
    args: &CompareArgs,
) -> CliResult<bool> {
    let options = resolve_options(config, &args.diff)?;
    let result = compare(&args.baseline, &args.candidate, &options)?.await?;

    if result.are_different {
        if let Some(ref diff_out) = args.diff_out {
            ensure_parent(diff_out)?;
            result.save_result_image(diff_out)?;
        }
    }

    match args.diff.format {
        OutputFormatArg::Json => reporter.raw(&result.summary().to_json()?),
        OutputFormatArg::Text => {
            let label = format!(
                "{} vs {} ({})",
                args.baseline.display(),
                args.candidate.display(),
                result.dimensions
            );
            if result.are_different {
                reporter.failure(&format!(
                    "{label}: {} pixels differ ({:.4}%)",
                    result.diff_pixel_count,
                    result.diff_percentage()
                ));
                if let Some(ref diff_out) = args.diff_out {
                    reporter.info(&format!("diff written to {}", diff_out.display()));
                }
            } else {
                reporter.success(&format!("{label}: identical"));
            }
        }
    }

    Ok(result.are_different)
}

/// Per-file entry of a `compare-dir` JSON report
#[derive(Debug, Serialize)]
struct DirEntryReport {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ComparisonSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Compare every PNG in the baseline directory with its counterpart.
/// Returns whether any pair differed, failed, or had no counterpart.
pub async fn run_compare_dir(
    reporter: &mut Reporter,
    config: &ShotdiffConfig,
    args: &CompareDirArgs,
) -> CliResult<bool> {
    let options = resolve_options(config, &args.diff)?;
    let started = Instant::now();

    let baseline_names = png_names(&args.baseline_dir)?;
    ensure_dir(&args.candidate_dir)?;

    let mut pairs = Vec::new();
    let mut missing = Vec::new();
    for name in baseline_names {
        let candidate = args.candidate_dir.join(&name);
        if candidate.is_file() {
            pairs.push((args.baseline_dir.join(&name), candidate, name));
        } else {
            missing.push(name);
        }
    }

    if let Some(ref diff_dir) = args.diff_dir {
        std::fs::create_dir_all(diff_dir)?;
    }

    reporter.start_progress(pairs.len() as u64, "comparing");
    let reporter_ref: &Reporter = reporter;
    let futures = pairs
        .into_iter()
        .map(|(baseline, candidate, name)| {
            let future = compare(&baseline, &candidate, &options);
            async move {
                let outcome = match future {
                    Ok(future) => future.await,
                    Err(e) => Err(e),
                };
                reporter_ref.increment(1);
                (name, outcome)
            }
        })
        .collect::<Vec<_>>();
    let outcomes = futures::future::join_all(futures).await;
    reporter.finish();

    let (mut passed, mut failed, mut errors) = (0usize, 0usize, 0usize);
    let mut entries = Vec::with_capacity(outcomes.len() + missing.len());

    for name in missing {
        errors += 1;
        let message = format!("no candidate in {}", args.candidate_dir.display());
        tracing::warn!(file = %name, "{message}");
        if args.diff.format == OutputFormatArg::Text {
            reporter.failure(&format!("{name}: {message}"));
        }
        entries.push(DirEntryReport {
            name,
            result: None,
            error: Some(message),
        });
    }

    for (name, outcome) in outcomes {
        match outcome {
            Ok(result) if result.are_different => {
                failed += 1;
                if let Some(ref diff_dir) = args.diff_dir {
                    result.save_result_image(diff_dir.join(&name))?;
                }
                if args.diff.format == OutputFormatArg::Text {
                    reporter.failure(&format!(
                        "{name}: {} pixels differ ({:.4}%)",
                        result.diff_pixel_count,
                        result.diff_percentage()
                    ));
                }
                entries.push(DirEntryReport {
                    name,
                    result: Some(result.summary()),
                    error: None,
                });
            }
            Ok(result) => {
                passed += 1;
                if args.diff.format == OutputFormatArg::Text {
                    reporter.success(&format!("{name}: identical"));
                }
                entries.push(DirEntryReport {
                    name,
                    result: Some(result.summary()),
                    error: None,
                });
            }
            Err(e) => {
                errors += 1;
                tracing::warn!(file = %name, error = %e, "comparison failed");
                if args.diff.format == OutputFormatArg::Text {
                    reporter.failure(&format!("{name}: {e}"));
                }
                entries.push(DirEntryReport {
                    name,
                    result: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    match args.diff.format {
        OutputFormatArg::Json => {
            let json =
                serde_json::to_string_pretty(&entries).map_err(shotdiff::ShotdiffError::from)?;
            reporter.raw(&json);
        }
        OutputFormatArg::Text => reporter.summary(passed, failed, errors, started.elapsed()),
    }

    Ok(failed + errors > 0)
}

/// Print the effective configuration as YAML
pub fn run_config(reporter: &Reporter, config: &ShotdiffConfig) -> CliResult<()> {
    reporter.raw(config.to_yaml()?.trim_end());
    Ok(())
}

fn ensure_dir(dir: &Path) -> CliResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CliError::invalid_argument(format!(
            "{} is not a directory",
            dir.display()
        )))
    }
}

/// Sorted file names of PNG images directly inside `dir`
fn png_names(dir: &Path) -> CliResult<Vec<String>> {
    ensure_dir(dir)?;

    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    Ok(names)
}

fn ensure_parent(path: &Path) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal reporter for comparison results
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` comparisons
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || !Term::stderr().is_term() {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefix("✓", "PASS", &Style::new().green().bold()), message);
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        self.line(&self.prefix("✗", "FAIL", &Style::new().red().bold()), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefix("⚠", "WARN", &Style::new().yellow().bold()), message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefix("ℹ", "INFO", &Style::new().blue().bold()), message);
    }

    /// Print raw output (JSON, YAML), ignoring quiet mode
    pub fn raw(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    /// Print a summary line for a batch of comparisons
    pub fn summary(&self, passed: usize, failed: usize, errors: usize, duration: Duration) {
        if self.quiet && failed == 0 && errors == 0 {
            return;
        }

        let _ = self.term.write_line("");
        let total = passed + failed + errors;
        let duration_secs = duration.as_secs_f64();
        let verdict = if failed + errors > 0 { "FAILED" } else { "PASSED" };

        if self.use_color {
            let status = if failed + errors > 0 {
                style(verdict).red().bold()
            } else {
                style(verdict).green().bold()
            };
            let _ = self.term.write_line(&format!(
                "{status} {total} comparisons in {duration_secs:.2}s ({} identical, {} different, {} errors)",
                style(passed).green(),
                style(failed).red(),
                style(errors).yellow()
            ));
        } else {
            let _ = self.term.write_line(&format!(
                "{verdict} {total} comparisons in {duration_secs:.2}s ({passed} identical, {failed} different, {errors} errors)"
            ));
        }
    }

    fn prefix(&self, symbol: &str, plain: &str, color: &Style) -> String {
        if self.use_color {
            color.apply_to(symbol).to_string()
        } else {
            plain.to_string()
        }
    }

    fn line(&self, prefix: &str, message: &str) {
        let line = format!("{prefix} {message}");
        match self.progress_bar {
            Some(ref pb) => pb.println(line),
            None => {
                let _ = self.term.write_line(&line);
            }
        }
    }
}

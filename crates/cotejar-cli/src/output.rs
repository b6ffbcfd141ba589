//! Output formatting and progress reporting

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output format for the reconciliation report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Progress reporter for the reconciliation run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Start a spinner while the containers load and the passes run
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    /// Clear the spinner
    pub fn finish_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Print one reconciliation line, green for consistent, red otherwise.
    /// Quiet mode only surfaces the inconsistent ones.
    pub fn result_line(&self, line: &str, consistent: bool) {
        if self.quiet && consistent {
            return;
        }
        if !self.use_color {
            println!("{line}");
        } else if consistent {
            println!("{}", style(line).green());
        } else {
            println!("{}", style(line).red().bold());
        }
    }

    /// Print the failure summary
    pub fn summary(&self, line: &str) {
        if self.use_color {
            println!("{}", style(line).red().bold());
        } else {
            println!("{line}");
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.use_color {
            let _ = self.term.write_line(&format!(
                "{} {}",
                style("✓").green().bold(),
                message
            ));
        } else {
            let _ = self.term.write_line(&format!("✓ {message}"));
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            let _ = self
                .term
                .write_line(&format!("{} {}", style("✗").red().bold(), message));
        } else {
            let _ = self.term.write_line(&format!("✗ {message}"));
        }
    }

    /// Print a plain line to stdout, unless quiet
    pub fn plain(&self, line: &str) {
        if self.quiet {
            return;
        }
        println!("{line}");
    }
}

//! Cotejador CLI library
//!
//! Command-line interface for the Cotejar coverage reconciliation.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod output;

pub use commands::{Cli, ColorArg, FormatArg};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, ProgressReporter};

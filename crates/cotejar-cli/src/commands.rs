//! CLI argument definitions using clap

use crate::config::ColorChoice;
use crate::output::OutputFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Cotejador: sanity checker for unit-selection voice databases
///
/// Reconciles the diphone coverage of a half-phone feature table with the
/// coverage reconstructed from a classification tree built over the same
/// units, and reports every diphone whose instance counts disagree.
#[derive(Parser, Debug)]
#[command(name = "cotejador")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Half-phone feature file (e.g. mary/halfphoneFeatures.mry)
    pub features: PathBuf,

    /// Classification tree file (e.g. mary/cart.mry)
    pub cart: PathBuf,

    /// Persist the diphone count table to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "text", value_enum)]
    pub format: FormatArg,

    /// List every unit index behind each diphone, per source
    #[arg(long)]
    pub dump_instances: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Color output
    #[arg(long, default_value = "auto", value_enum)]
    pub color: ColorArg,
}

/// Color choice as a clap value enum
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorArg {
    /// Use colors when output is a terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Report format as a clap value enum
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

//! Cotejador: CLI for reconciling unit-selection voice databases
//!
//! ## Usage
//!
//! ```bash
//! cotejador mary/halfphoneFeatures.mry mary/cart.mry
//! cotejador f.mry c.mry --output coverage.txt   # persist the count table
//! cotejador f.mry c.mry --format json           # machine-readable report
//! ```

use clap::Parser;
use cotejador::{Cli, CliConfig, CliError, CliResult, OutputFormat, ProgressReporter, Verbosity};
use cotejar::{report, CheckOutcome, SanityCheck};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match run(&cli, config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };
    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(cli.color.into())
}

fn init_tracing(verbosity: Verbosity) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, config: CliConfig) -> CliResult<bool> {
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    reporter.start_spinner("Reconciling diphone coverage");
    let result = SanityCheck::new(&cli.features, &cli.cart).run();
    reporter.finish_spinner();
    let outcome = result?;

    match OutputFormat::from(cli.format) {
        OutputFormat::Text => print_text(&reporter, &outcome),
        OutputFormat::Json => print_json(&outcome)?,
    }

    if cli.dump_instances {
        reporter.plain("Database diphone instances:");
        for line in report::render_instances(&outcome.table, &outcome.table_diphones)? {
            reporter.plain(&line);
        }
        reporter.plain("Tree diphone instances:");
        for line in report::render_instances(&outcome.table, &outcome.tree_diphones)? {
            reporter.plain(&line);
        }
    }

    if let Some(path) = &cli.output {
        report::write_table(path, &outcome.report)?;
        reporter.success(&format!("Wrote diphone counts to {}", path.display()));
    }

    if outcome.report.passed {
        reporter.success("All diphones reconciled");
    } else {
        reporter.error(&format!(
            "{} diphone units failed the sanity check",
            outcome.report.mismatch_count
        ));
    }
    Ok(outcome.report.passed)
}

fn print_text(reporter: &ProgressReporter, outcome: &CheckOutcome) {
    for record in outcome.report.consistent() {
        reporter.result_line(&report::format_record(record), true);
    }
    for record in outcome.report.mismatched() {
        reporter.result_line(&report::format_record(record), false);
    }
    if let Some(summary) = report::format_summary(&outcome.report) {
        reporter.summary(&summary);
    }
}

fn print_json(outcome: &CheckOutcome) -> CliResult<()> {
    let json = serde_json::to_string_pretty(&outcome.report)
        .map_err(|e| CliError::report_generation(e.to_string()))?;
    println!("{json}");
    Ok(())
}

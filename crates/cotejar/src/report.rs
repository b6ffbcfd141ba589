//! Rendering and persistence of the reconciliation result.

use crate::compare::{CoverageRecord, CoverageReport};
use crate::extract::{feature_str, DiphoneFeatures, DiphoneInventory};
use crate::features::FeatureTable;
use crate::result::CotejarResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Format one record as a console line with its OK/NOT OK annotation.
#[must_use]
pub fn format_record(record: &CoverageRecord) -> String {
    if record.is_consistent() {
        format!(
            "For diphone: {} ; units in database: {} ; units in tree: {} --> OK.",
            record.diphone, record.table_count, record.tree_count
        )
    } else {
        format!(
            "WARNING :: For diphone: {} ; units in database: {} ; units in tree: {} --> NOT OK.",
            record.diphone, record.table_count, record.tree_count
        )
    }
}

/// The closing summary line, present only when something failed.
#[must_use]
pub fn format_summary(report: &CoverageReport) -> Option<String> {
    if report.mismatch_count == 0 {
        None
    } else {
        Some(format!(
            "ERROR: failed sanity check for {} diphone units",
            report.mismatch_count
        ))
    }
}

/// Render the full console report: OK records first, then mismatches,
/// then the failure summary when any mismatch exists.
#[must_use]
pub fn render_lines(report: &CoverageReport) -> Vec<String> {
    let mut lines: Vec<String> = report.consistent().map(format_record).collect();
    lines.extend(report.mismatched().map(format_record));
    lines.extend(format_summary(report));
    lines
}

/// Persist the report as whitespace-separated `diphone table tree` rows.
///
/// Rows keep the report's pure count-ascending order; the OK/NOT OK
/// partitioning is a console concern only.
pub fn write_table(path: &Path, report: &CoverageReport) -> CotejarResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for record in &report.records {
        writeln!(
            out,
            "{} {} {}",
            record.diphone, record.table_count, record.tree_count
        )?;
    }
    out.flush()?;
    Ok(())
}

/// List each diphone with the units instantiating it, one indented line
/// per unit carrying its index and half-phone unit name.
pub fn render_instances(
    table: &FeatureTable,
    inventory: &DiphoneInventory,
) -> CotejarResult<Vec<String>> {
    let features = DiphoneFeatures::resolve(table.definition())?;
    let mut lines = Vec::new();
    for (diphone, units) in inventory {
        lines.push(format!("{diphone} {}", units.len()));
        for &unit in units {
            let unit_name = feature_str(table, unit as usize, features.unit_name)?;
            lines.push(format!("   {unit} {unit_name}"));
        }
    }
    Ok(lines)
}

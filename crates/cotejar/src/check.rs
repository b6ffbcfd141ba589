//! The sanity-check driver: two extraction passes and one comparison.

use crate::cart::Cart;
use crate::compare::{compare, CoverageReport};
use crate::extract::{self, DiphoneInventory};
use crate::features::FeatureTable;
use crate::result::CotejarResult;
use std::path::PathBuf;
use tracing::info;

/// Everything one reconciliation run produced.
#[derive(Debug)]
pub struct CheckOutcome {
    /// The loaded feature table, kept for instance listings.
    pub table: FeatureTable,
    /// Diphone coverage as seen by the table pass.
    pub table_diphones: DiphoneInventory,
    /// Diphone coverage as reconstructed from the tree's leaves.
    pub tree_diphones: DiphoneInventory,
    /// The sorted, classified comparison.
    pub report: CoverageReport,
}

/// One cross-structure coverage reconciliation over a voice database.
///
/// Loads both containers read-only, derives the diphone inventory from each
/// independently and compares the counts. Configuration and IO failures
/// abort the run; count mismatches are a finding carried in the report's
/// `passed` flag, never an error.
#[derive(Debug, Clone)]
pub struct SanityCheck {
    features_path: PathBuf,
    cart_path: PathBuf,
}

impl SanityCheck {
    /// Set up a check over a half-phone feature file and a tree file.
    #[must_use]
    pub fn new(features_path: impl Into<PathBuf>, cart_path: impl Into<PathBuf>) -> Self {
        Self {
            features_path: features_path.into(),
            cart_path: cart_path.into(),
        }
    }

    /// Run both extraction passes and the comparison.
    pub fn run(&self) -> CotejarResult<CheckOutcome> {
        let table = FeatureTable::load(&self.features_path)?;
        let feature_names = table
            .definition()
            .feature_names()
            .collect::<Vec<_>>()
            .join(" ");
        info!(features = %feature_names, "features used to build the voice");

        let table_diphones = extract::table_diphones(&table)?;
        let cart = Cart::load(&self.cart_path)?;
        let tree_diphones = extract::cart_diphones(&cart, &table)?;
        let report = compare(&table_diphones, &tree_diphones);

        info!(
            num_diphones = report.records.len(),
            mismatches = report.mismatch_count,
            passed = report.passed,
            "reconciliation complete"
        );
        Ok(CheckOutcome {
            table,
            table_diphones,
            tree_diphones,
            report,
        })
    }
}

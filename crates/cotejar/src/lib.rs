//! Cotejar: coverage reconciliation for unit-selection voice databases.
//!
//! A unit-selection voice carries two independently built views of the same
//! corpus: a flat per-unit feature table and a classification tree whose
//! leaves index into it. Both must agree on which diphones exist and how
//! many training instances each one has; a divergence means the tree was
//! built against different data than the table describes.
//!
//! # Architecture
//!
//! ```text
//! halfphoneFeatures.mry ──→ FeatureTable ──→ table_diphones ──┐
//!                                │                            ├──→ compare ──→ CoverageReport
//! cart.mry ────────────────→ Cart leaves ──→ cart_diphones ───┘
//! ```
//!
//! Both extraction passes produce a diphone → unit-index-set inventory; the
//! comparison sorts every table diphone by instance count and classifies it
//! as consistent or not. Mismatches are findings, not errors: the report's
//! `passed` flag carries the overall verdict.

#![warn(missing_docs)]

pub mod cart;
pub mod check;
pub mod compare;
mod container;
pub mod extract;
pub mod features;
pub mod report;
mod result;
#[cfg(test)]
pub(crate) mod testutil;

pub use cart::{Cart, CartNode};
pub use check::{CheckOutcome, SanityCheck};
pub use compare::{compare, CoverageRecord, CoverageReport, CoverageStatus};
pub use extract::{cart_diphones, diphone_key, table_diphones, DiphoneFeatures, DiphoneInventory};
pub use features::{
    FeatureDefinition, FeatureTable, FeatureVector, HalfPhoneSide, LEFT_RIGHT_FEATURE,
    PHONE_FEATURE, UNIT_NAME_FEATURE,
};
pub use result::{CotejarError, CotejarResult};

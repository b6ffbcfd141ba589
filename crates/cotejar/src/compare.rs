//! Comparison of the two independently derived diphone inventories.

use crate::extract::DiphoneInventory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether a diphone's counts reconcile across the two structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageStatus {
    /// Table and tree agree on the instance count.
    Ok,
    /// The counts differ.
    Mismatch,
}

/// One diphone's instance counts in both structures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRecord {
    /// The diphone key (`<prev>_<cur>`).
    pub diphone: String,
    /// Number of instances found by the table pass.
    pub table_count: usize,
    /// Number of instances found by the tree pass (0 when absent).
    pub tree_count: usize,
}

impl CoverageRecord {
    /// Whether both structures agree on this diphone.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.table_count == self.tree_count
    }

    /// Classification of this record.
    #[must_use]
    pub fn status(&self) -> CoverageStatus {
        if self.is_consistent() {
            CoverageStatus::Ok
        } else {
            CoverageStatus::Mismatch
        }
    }
}

/// The full reconciliation result, sorted ascending by table count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// One record per table diphone, ascending by `table_count`.
    pub records: Vec<CoverageRecord>,
    /// Number of records whose counts differ.
    pub mismatch_count: usize,
    /// True iff every diphone reconciled.
    pub passed: bool,
}

impl CoverageReport {
    /// Records whose counts agree, preserving report order.
    pub fn consistent(&self) -> impl Iterator<Item = &CoverageRecord> {
        self.records.iter().filter(|r| r.is_consistent())
    }

    /// Records whose counts differ, preserving report order.
    pub fn mismatched(&self) -> impl Iterator<Item = &CoverageRecord> {
        self.records.iter().filter(|r| !r.is_consistent())
    }
}

/// Merge the two inventories into a sorted, classified report.
///
/// The table is authoritative for the key universe: every table diphone
/// yields a record, while diphones only the tree knows are not reported.
/// Records are sorted by table count alone; the stable sort over the
/// name-ordered inventory leaves equal counts in a fixed but semantically
/// arbitrary order. No secondary sort key is intended.
#[must_use]
pub fn compare(table: &DiphoneInventory, tree: &DiphoneInventory) -> CoverageReport {
    let mut records: Vec<CoverageRecord> = table
        .iter()
        .map(|(diphone, units)| CoverageRecord {
            diphone: diphone.clone(),
            table_count: units.len(),
            tree_count: tree.get(diphone).map_or(0, BTreeSet::len),
        })
        .collect();
    records.sort_by_key(|r| r.table_count);

    let mismatch_count = records.iter().filter(|r| !r.is_consistent()).count();
    CoverageReport {
        passed: mismatch_count == 0,
        mismatch_count,
        records,
    }
}

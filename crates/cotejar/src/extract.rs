//! Diphone extraction from the two independent corpus structures.
//!
//! Both passes derive the same kind of mapping — diphone key to the set of
//! unit indices instantiating it — but from different sources: the table
//! pass walks the feature vectors in storage order and pairs each left-half
//! unit with its positional predecessor; the tree pass flattens every leaf
//! of the classification tree and reconstructs each diphone by re-fetching
//! the unit and its index predecessor from the table. Divergent counts
//! between the two are exactly what the comparison stage exists to find.

use crate::cart::Cart;
use crate::features::{
    FeatureDefinition, FeatureTable, HalfPhoneSide, LEFT_RIGHT_FEATURE, PHONE_FEATURE,
    UNIT_NAME_FEATURE,
};
use crate::result::{CotejarError, CotejarResult};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

/// Separator between the two phone labels of a diphone key.
pub const DIPHONE_SEPARATOR: char = '_';

/// Diphone key → set of unit indices instantiating it in one source.
///
/// Ordered containers so that identical inputs yield identical iteration
/// order from run to run.
pub type DiphoneInventory = BTreeMap<String, BTreeSet<i32>>;

/// Build a diphone key from the predecessor's and the unit's phone labels.
#[must_use]
pub fn diphone_key(prev_phone: &str, cur_phone: &str) -> String {
    format!("{prev_phone}{DIPHONE_SEPARATOR}{cur_phone}")
}

/// The three feature indices every extraction pass needs, resolved once.
#[derive(Debug, Clone, Copy)]
pub struct DiphoneFeatures {
    /// Index of the phone-label feature.
    pub phone: usize,
    /// Index of the half-phone unit-name feature.
    pub unit_name: usize,
    /// Index of the left/right flag feature.
    pub side: usize,
}

impl DiphoneFeatures {
    /// Resolve the required feature indices against a definition.
    pub fn resolve(definition: &FeatureDefinition) -> CotejarResult<Self> {
        let resolve = |name: &str| {
            definition
                .feature_index(name)
                .ok_or_else(|| CotejarError::missing_feature(name))
        };
        Ok(Self {
            phone: resolve(PHONE_FEATURE)?,
            unit_name: resolve(UNIT_NAME_FEATURE)?,
            side: resolve(LEFT_RIGHT_FEATURE)?,
        })
    }
}

pub(crate) fn feature_str<'a>(
    table: &'a FeatureTable,
    position: usize,
    feature: usize,
) -> CotejarResult<&'a str> {
    table
        .feature_str(position, feature)
        .ok_or_else(|| CotejarError::invalid_vector(position, "value not decodable"))
}

fn is_right_half(
    table: &FeatureTable,
    position: usize,
    features: DiphoneFeatures,
) -> CotejarResult<bool> {
    let label = feature_str(table, position, features.side)?;
    Ok(HalfPhoneSide::parse(label) == Some(HalfPhoneSide::Right))
}

/// Scan the feature table in storage order and collect its diphone coverage.
///
/// A unit anchors a diphone iff it carries a positive unit index and is a
/// left half; its partner is the row immediately before it in the table,
/// not whatever `unit_index - 1` happens to name. Row 0 has no predecessor
/// and is never counted.
pub fn table_diphones(table: &FeatureTable) -> CotejarResult<DiphoneInventory> {
    let features = DiphoneFeatures::resolve(table.definition())?;
    let mut inventory = DiphoneInventory::new();

    for position in 0..table.num_units() {
        let Some(fv) = table.vector(position) else {
            break;
        };
        if fv.is_sentinel() {
            continue;
        }
        if position == 0 {
            // no predecessor row to pair with
            continue;
        }
        if is_right_half(table, position, features)? {
            continue;
        }
        let prev_phone = feature_str(table, position - 1, features.phone)?;
        let cur_phone = feature_str(table, position, features.phone)?;
        inventory
            .entry(diphone_key(prev_phone, cur_phone))
            .or_default()
            .insert(fv.unit_index());
    }

    debug!(num_diphones = inventory.len(), "table pass complete");
    Ok(inventory)
}

/// Flatten the tree's leaves and reconstruct its diphone coverage.
///
/// The tree stores bare unit indices, so diphone identity is re-derived
/// from the feature table with the index as join key. A unit only counts
/// when its index predecessor is itself reachable from some leaf; indices
/// outside the table are reported and skipped, not fatal.
pub fn cart_diphones(cart: &Cart, table: &FeatureTable) -> CotejarResult<DiphoneInventory> {
    let features = DiphoneFeatures::resolve(table.definition())?;
    let all_tree_units: Vec<i32> = cart.leaf_units().collect();
    let reachable: HashSet<i32> = all_tree_units.iter().copied().collect();
    let num_units = table.num_units();
    let mut inventory = DiphoneInventory::new();

    for &unit in &all_tree_units {
        if unit <= 0 {
            continue;
        }
        let position = unit as usize;
        if position >= num_units {
            warn!(
                unit_index = unit,
                table_size = num_units,
                "tree leaf references a unit outside the feature table"
            );
            continue;
        }
        if is_right_half(table, position, features)? {
            continue;
        }
        if !reachable.contains(&(unit - 1)) {
            continue;
        }
        let prev_phone = feature_str(table, position - 1, features.phone)?;
        let cur_phone = feature_str(table, position, features.phone)?;
        inventory
            .entry(diphone_key(prev_phone, cur_phone))
            .or_default()
            .insert(unit);
    }

    debug!(
        num_diphones = inventory.len(),
        num_tree_units = all_tree_units.len(),
        "tree pass complete"
    );
    Ok(inventory)
}

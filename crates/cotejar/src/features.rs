//! The flat per-unit feature table of a unit-selection voice.
//!
//! A [`FeatureTable`] owns an immutable [`FeatureDefinition`] (feature names
//! and their categorical value tables) and the ordered sequence of
//! [`FeatureVector`]s, one per half-phone unit. Vectors store compact value
//! ids; decoding to strings always goes through the definition. The table is
//! read fully into memory once and never written to during a run.

use crate::container::{ContainerReader, ContainerWriter};
use crate::result::{CotejarError, CotejarResult};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Payload kind string of a feature-table container.
pub const FEATURE_TABLE_KIND: &str = "FEATS";

/// Name of the phone-label feature.
pub const PHONE_FEATURE: &str = "phone";

/// Name of the half-phone unit-name feature.
pub const UNIT_NAME_FEATURE: &str = "halfphone_unitname";

/// Name of the left/right half-phone flag feature.
pub const LEFT_RIGHT_FEATURE: &str = "halfphone_lr";

/// Which half of its phone a unit covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfPhoneSide {
    /// The left half. Left halves anchor diphone boundaries.
    Left,
    /// The right half, the second half of the previous diphone pairing.
    Right,
}

impl HalfPhoneSide {
    /// Parse the stored flag value (`"L"` or `"R"`).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "L" => Some(Self::Left),
            "R" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Immutable mapping from feature name to index, with per-feature value tables.
///
/// Only categorical (string-valued) features are modeled; the coverage
/// reconciliation consults nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDefinition {
    names: Vec<String>,
    index: HashMap<String, usize>,
    values: Vec<Vec<String>>,
}

impl FeatureDefinition {
    /// Build a definition from `(name, value table)` pairs.
    #[must_use]
    pub fn new(features: Vec<(String, Vec<String>)>) -> Self {
        let mut names = Vec::with_capacity(features.len());
        let mut index = HashMap::with_capacity(features.len());
        let mut values = Vec::with_capacity(features.len());
        for (i, (name, table)) in features.into_iter().enumerate() {
            index.insert(name.clone(), i);
            names.push(name);
            values.push(table);
        }
        Self {
            names,
            index,
            values,
        }
    }

    /// Number of defined features.
    #[must_use]
    pub fn num_features(&self) -> usize {
        self.names.len()
    }

    /// Resolve a feature name to its index.
    #[must_use]
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of the feature at `feature`.
    #[must_use]
    pub fn feature_name(&self, feature: usize) -> Option<&str> {
        self.names.get(feature).map(String::as_str)
    }

    /// All feature names, in definition order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Decode a stored value id for the feature at `feature`.
    #[must_use]
    pub fn value(&self, feature: usize, id: u16) -> Option<&str> {
        self.values
            .get(feature)
            .and_then(|table| table.get(usize::from(id)))
            .map(String::as_str)
    }

    /// Reverse lookup of a value string for the feature at `feature`.
    #[must_use]
    pub fn value_id(&self, feature: usize, value: &str) -> Option<u16> {
        self.values
            .get(feature)?
            .iter()
            .position(|v| v == value)
            .and_then(|p| u16::try_from(p).ok())
    }

    fn num_values(&self, feature: usize) -> usize {
        self.values.get(feature).map_or(0, Vec::len)
    }
}

/// One unit's ordered feature values, stored as compact value ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector {
    unit_index: i32,
    values: Vec<u16>,
}

impl FeatureVector {
    /// Create a vector for the unit at `unit_index` with one id per feature.
    #[must_use]
    pub fn new(unit_index: i32, values: Vec<u16>) -> Self {
        Self { unit_index, values }
    }

    /// The unit's position in the corpus. Non-positive values are sentinels.
    #[must_use]
    pub fn unit_index(&self) -> i32 {
        self.unit_index
    }

    /// Whether this row is a sentinel ("no unit") marker.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.unit_index <= 0
    }

    /// Raw value id of the feature at `feature`.
    #[must_use]
    pub fn value_id(&self, feature: usize) -> Option<u16> {
        self.values.get(feature).copied()
    }
}

/// Read-only accessor over the per-unit feature vectors of one voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTable {
    definition: FeatureDefinition,
    vectors: Vec<FeatureVector>,
}

impl FeatureTable {
    /// Assemble a table, validating every vector against the definition.
    ///
    /// Each row must carry exactly one value id per defined feature, every
    /// id must be within its feature's value table, and each row with a
    /// positive unit index must be stored at the position equal to that
    /// index. The table pass pairs neighbours by position while the tree
    /// pass pairs them by index arithmetic; the two only coincide under
    /// that ordering invariant, so it is checked here instead of assumed.
    pub fn new(definition: FeatureDefinition, vectors: Vec<FeatureVector>) -> CotejarResult<Self> {
        for (position, fv) in vectors.iter().enumerate() {
            if fv.values.len() != definition.num_features() {
                return Err(CotejarError::invalid_vector(
                    position,
                    format!(
                        "expected {} values, found {}",
                        definition.num_features(),
                        fv.values.len()
                    ),
                ));
            }
            for (feature, &id) in fv.values.iter().enumerate() {
                if usize::from(id) >= definition.num_values(feature) {
                    return Err(CotejarError::invalid_vector(
                        position,
                        format!("value id {id} out of range for feature {feature}"),
                    ));
                }
            }
            if fv.unit_index > 0 && fv.unit_index as usize != position {
                return Err(CotejarError::UnorderedTable {
                    position,
                    unit_index: fv.unit_index,
                });
            }
        }
        Ok(Self {
            definition,
            vectors,
        })
    }

    /// The shared feature definition.
    #[must_use]
    pub fn definition(&self) -> &FeatureDefinition {
        &self.definition
    }

    /// Number of rows in the table.
    #[must_use]
    pub fn num_units(&self) -> usize {
        self.vectors.len()
    }

    /// The vector stored at `position`, if any.
    #[must_use]
    pub fn vector(&self, position: usize) -> Option<&FeatureVector> {
        self.vectors.get(position)
    }

    /// All vectors in table order.
    #[must_use]
    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    /// Decode the feature at `feature` for the unit at `position`.
    #[must_use]
    pub fn feature_str(&self, position: usize, feature: usize) -> Option<&str> {
        let id = self.vectors.get(position)?.value_id(feature)?;
        self.definition.value(feature, id)
    }

    /// Load a feature-table container.
    pub fn load(path: &Path) -> CotejarResult<Self> {
        let mut r = ContainerReader::open(path)?;
        r.expect_header(FEATURE_TABLE_KIND)?;

        let num_features = r.read_u32()? as usize;
        let mut features = Vec::new();
        for _ in 0..num_features {
            let name = r.read_string()?;
            let num_values = r.read_u32()? as usize;
            let mut values = Vec::new();
            for _ in 0..num_values {
                values.push(r.read_string()?);
            }
            features.push((name, values));
        }
        let definition = FeatureDefinition::new(features);

        let num_units = r.read_u32()? as usize;
        let mut vectors = Vec::new();
        for _ in 0..num_units {
            let unit_index = r.read_i32()?;
            let mut values = Vec::with_capacity(definition.num_features());
            for _ in 0..definition.num_features() {
                values.push(r.read_u16()?);
            }
            vectors.push(FeatureVector::new(unit_index, values));
        }

        debug!(
            path = %path.display(),
            num_features,
            num_units,
            "loaded feature table"
        );
        Self::new(definition, vectors)
    }

    /// Write this table as a feature-table container.
    pub fn write(&self, path: &Path) -> CotejarResult<()> {
        let mut w = ContainerWriter::create(path)?;
        w.write_header(FEATURE_TABLE_KIND)?;

        w.write_u32(self.definition.num_features() as u32)?;
        for (feature, name) in self.definition.names.iter().enumerate() {
            w.write_string(name)?;
            let values = &self.definition.values[feature];
            w.write_u32(values.len() as u32)?;
            for value in values {
                w.write_string(value)?;
            }
        }

        w.write_u32(self.vectors.len() as u32)?;
        for fv in &self.vectors {
            w.write_i32(fv.unit_index)?;
            for &id in &fv.values {
                w.write_u16(id)?;
            }
        }
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_feature_definition() -> FeatureDefinition {
        FeatureDefinition::new(vec![
            (
                PHONE_FEATURE.to_string(),
                vec!["a".to_string(), "b".to_string()],
            ),
            (
                LEFT_RIGHT_FEATURE.to_string(),
                vec!["L".to_string(), "R".to_string()],
            ),
        ])
    }

    #[test]
    fn test_feature_index_resolution() {
        let def = two_feature_definition();
        assert_eq!(def.feature_index(PHONE_FEATURE), Some(0));
        assert_eq!(def.feature_index(LEFT_RIGHT_FEATURE), Some(1));
        assert_eq!(def.feature_index("mcep"), None);
    }

    #[test]
    fn test_value_decoding() {
        let def = two_feature_definition();
        assert_eq!(def.value(0, 1), Some("b"));
        assert_eq!(def.value(1, 0), Some("L"));
        assert_eq!(def.value(0, 9), None);
        assert_eq!(def.value_id(0, "b"), Some(1));
        assert_eq!(def.value_id(0, "z"), None);
    }

    #[test]
    fn test_half_phone_side_parse() {
        assert_eq!(HalfPhoneSide::parse("L"), Some(HalfPhoneSide::Left));
        assert_eq!(HalfPhoneSide::parse("R"), Some(HalfPhoneSide::Right));
        assert_eq!(HalfPhoneSide::parse("0"), None);
    }

    #[test]
    fn test_table_accepts_ordered_rows() {
        let def = two_feature_definition();
        let table = FeatureTable::new(
            def,
            vec![
                FeatureVector::new(0, vec![0, 0]),
                FeatureVector::new(1, vec![1, 1]),
            ],
        )
        .unwrap();
        assert_eq!(table.num_units(), 2);
        assert_eq!(table.feature_str(1, 0), Some("b"));
        assert_eq!(table.feature_str(1, 1), Some("R"));
    }

    #[test]
    fn test_table_rejects_misplaced_unit_index() {
        let def = two_feature_definition();
        let err = FeatureTable::new(
            def,
            vec![
                FeatureVector::new(0, vec![0, 0]),
                FeatureVector::new(5, vec![0, 0]),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CotejarError::UnorderedTable {
                position: 1,
                unit_index: 5
            }
        ));
    }

    #[test]
    fn test_table_rejects_wrong_arity() {
        let def = two_feature_definition();
        let err = FeatureTable::new(def, vec![FeatureVector::new(0, vec![0])]).unwrap_err();
        assert!(matches!(err, CotejarError::InvalidVector { position: 0, .. }));
    }

    #[test]
    fn test_table_rejects_out_of_range_value_id() {
        let def = two_feature_definition();
        let err = FeatureTable::new(def, vec![FeatureVector::new(0, vec![7, 0])]).unwrap_err();
        assert!(matches!(err, CotejarError::InvalidVector { position: 0, .. }));
    }

    #[test]
    fn test_sentinel_rows_may_sit_anywhere() {
        let def = two_feature_definition();
        // sentinels carry no unit index, so they are exempt from the
        // position == index check
        let table = FeatureTable::new(
            def,
            vec![
                FeatureVector::new(-1, vec![0, 0]),
                FeatureVector::new(1, vec![0, 0]),
                FeatureVector::new(0, vec![1, 1]),
            ],
        );
        assert!(table.is_ok());
    }

    #[test]
    fn test_container_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("halfphoneFeatures.mry");
        let def = two_feature_definition();
        let table = FeatureTable::new(
            def,
            vec![
                FeatureVector::new(0, vec![0, 0]),
                FeatureVector::new(1, vec![1, 1]),
                FeatureVector::new(2, vec![0, 0]),
            ],
        )
        .unwrap();
        table.write(&path).unwrap();
        let loaded = FeatureTable::load(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_rejects_wrong_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.mry");
        let cart = crate::cart::Cart::new(crate::cart::CartNode::Leaf { units: vec![1] });
        cart.write(&path).unwrap();
        let err = FeatureTable::load(&path).unwrap_err();
        assert!(matches!(err, CotejarError::Format { .. }));
    }
}

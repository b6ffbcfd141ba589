//! Shared fixtures for unit tests.

use crate::features::{
    FeatureDefinition, FeatureTable, FeatureVector, LEFT_RIGHT_FEATURE, PHONE_FEATURE,
    UNIT_NAME_FEATURE,
};

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// Build a table from `(unit_index, phone, side)` rows, deriving the
/// half-phone unit name as `<phone>_<side>`.
pub(crate) fn phone_table(rows: &[(i32, &str, &str)]) -> FeatureTable {
    let mut phones = Vec::new();
    let mut unit_names = Vec::new();
    let mut sides = Vec::new();
    for &(_, phone, side) in rows {
        push_unique(&mut phones, phone);
        push_unique(&mut unit_names, &format!("{phone}_{side}"));
        push_unique(&mut sides, side);
    }
    let definition = FeatureDefinition::new(vec![
        (PHONE_FEATURE.to_string(), phones),
        (UNIT_NAME_FEATURE.to_string(), unit_names),
        (LEFT_RIGHT_FEATURE.to_string(), sides),
    ]);
    let vectors = rows
        .iter()
        .map(|&(unit_index, phone, side)| {
            FeatureVector::new(
                unit_index,
                vec![
                    definition.value_id(0, phone).unwrap(),
                    definition
                        .value_id(1, &format!("{phone}_{side}"))
                        .unwrap(),
                    definition.value_id(2, side).unwrap(),
                ],
            )
        })
        .collect();
    FeatureTable::new(definition, vectors).unwrap()
}

/// A table whose definition lacks the left/right flag feature.
pub(crate) fn table_without_lr_feature() -> FeatureTable {
    let definition = FeatureDefinition::new(vec![
        (PHONE_FEATURE.to_string(), vec!["a".to_string()]),
        (UNIT_NAME_FEATURE.to_string(), vec!["a_L".to_string()]),
    ]);
    let vectors = vec![FeatureVector::new(0, vec![0, 0])];
    FeatureTable::new(definition, vectors).unwrap()
}

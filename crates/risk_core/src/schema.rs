//! Model input row layouts
//!
//! A layout is the ordered list of column names a classifier was trained on.
//! Rows are always built from a layout so field order cannot drift from it.
use crate::errors::{Result, RiskCoreError};
use crate::features::EngineeredFeatures;
use crate::record::EncodedRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Columns taken directly from the (encoded) form
pub const BASE_COLUMNS: [&str; 23] = [
    "LIMIT_BAL",
    "SEX",
    "EDUCATION",
    "MARRIAGE",
    "AGE",
    "PAY_0",
    "PAY_2",
    "PAY_3",
    "PAY_4",
    "PAY_5",
    "PAY_6",
    "BILL_AMT1",
    "BILL_AMT2",
    "BILL_AMT3",
    "BILL_AMT4",
    "BILL_AMT5",
    "BILL_AMT6",
    "PAY_AMT1",
    "PAY_AMT2",
    "PAY_AMT3",
    "PAY_AMT4",
    "PAY_AMT5",
    "PAY_AMT6",
];

/// Columns derived by the feature engineer, appended after the base columns
pub const ENGINEERED_COLUMNS: [&str; 4] = [
    "TOTAL_BILL_AMT",
    "TOTAL_PAY_AMT",
    "PAYMENT_RATIO",
    "HAS_MISSED_PAYMENT",
];

/// Column set a classifier expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureLayout {
    /// Base columns followed by engineered columns
    Engineered,
    /// Base columns only
    Base,
}

impl FeatureLayout {
    /// Ordered column names for this layout
    pub fn columns(self) -> Vec<&'static str> {
        match self {
            FeatureLayout::Engineered => BASE_COLUMNS
                .iter()
                .chain(ENGINEERED_COLUMNS.iter())
                .copied()
                .collect(),
            FeatureLayout::Base => BASE_COLUMNS.to_vec(),
        }
    }

    pub fn width(self) -> usize {
        match self {
            FeatureLayout::Engineered => BASE_COLUMNS.len() + ENGINEERED_COLUMNS.len(),
            FeatureLayout::Base => BASE_COLUMNS.len(),
        }
    }

    /// Layout whose columns equal `names` exactly, in order
    pub fn matching(names: &[String]) -> Option<FeatureLayout> {
        [FeatureLayout::Engineered, FeatureLayout::Base]
            .into_iter()
            .find(|layout| layout.columns().iter().eq(names.iter()))
    }

    /// Check that `expected` has this layout's columns in this layout's order
    pub fn ensure_matches(self, expected: &[String]) -> Result<()> {
        let columns = self.columns();
        if columns.iter().eq(expected.iter()) {
            return Ok(());
        }

        let missing: Vec<&str> = expected
            .iter()
            .filter(|name| !columns.contains(&name.as_str()))
            .map(String::as_str)
            .collect();
        let extra: Vec<&str> = columns
            .iter()
            .filter(|col| !expected.iter().any(|name| name == *col))
            .copied()
            .collect();

        let detail = if missing.is_empty() && extra.is_empty() {
            let position = columns
                .iter()
                .zip(expected.iter())
                .position(|(a, b)| a != b)
                .unwrap_or(0);
            format!(
                "column order differs at position {position}: row has {}, classifier expects {}",
                columns.get(position).copied().unwrap_or("<none>"),
                expected.get(position).map(String::as_str).unwrap_or("<none>")
            )
        } else {
            format!(
                "row lacks columns {missing:?} and has unexpected columns {extra:?}"
            )
        };

        Err(RiskCoreError::SchemaMismatch(format!("{self} layout: {detail}")))
    }
}

impl fmt::Display for FeatureLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureLayout::Engineered => f.write_str("engineered"),
            FeatureLayout::Base => f.write_str("base"),
        }
    }
}

impl FromStr for FeatureLayout {
    type Err = RiskCoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "engineered" => Ok(FeatureLayout::Engineered),
            "base" => Ok(FeatureLayout::Base),
            other => Err(RiskCoreError::Config(format!("Unknown feature layout: {other}"))),
        }
    }
}

/// One ordered record handed to the classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInputRow {
    layout: FeatureLayout,
    values: Vec<f64>,
}

impl ModelInputRow {
    /// Assemble a row for `layout` from an encoded record and its features
    pub fn build(
        layout: FeatureLayout,
        record: &EncodedRecord,
        features: &EngineeredFeatures,
    ) -> Self {
        let mut values = Vec::with_capacity(layout.width());

        values.push(record.limit_balance);
        values.push(f64::from(record.gender));
        values.push(f64::from(record.education));
        values.push(f64::from(record.marital_status));
        values.push(f64::from(record.age));
        values.extend(record.payment_status.iter().map(|&code| f64::from(code)));
        values.extend_from_slice(&record.bill_amounts);
        values.extend_from_slice(&record.payment_amounts);

        if layout == FeatureLayout::Engineered {
            values.push(features.total_bill);
            values.push(features.total_paid);
            values.push(features.payment_ratio);
            values.push(f64::from(features.has_missed_payment));
        }

        debug_assert_eq!(values.len(), layout.width());
        Self { layout, values }
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    /// Column values in layout order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column
    pub fn get(&self, column: &str) -> Option<f64> {
        self.layout
            .columns()
            .iter()
            .position(|name| *name == column)
            .map(|idx| self.values[idx])
    }

    /// `(column, value)` pairs in layout order
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        self.layout
            .columns()
            .into_iter()
            .zip(self.values.iter().copied())
            .collect()
    }
}

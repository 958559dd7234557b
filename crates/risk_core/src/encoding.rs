//! Categorical encodings for form inputs
//!
//! Each category is a closed table of `(label, code)` pairs. Tables are
//! static and never mutated; `EncodingTables` is the immutable handle the
//! predictor borrows for every request.
use crate::errors::{Result, RiskCoreError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical input kinds offered by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Gender,
    Education,
    MaritalStatus,
    PaymentStatus,
}

impl Category {
    /// All categories in form order
    pub const ALL: [Category; 4] = [
        Category::Gender,
        Category::Education,
        Category::MaritalStatus,
        Category::PaymentStatus,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Gender => "gender",
            Category::Education => "education",
            Category::MaritalStatus => "marital status",
            Category::PaymentStatus => "payment status",
        };
        f.write_str(name)
    }
}

const GENDER: &[(&str, i32)] = &[("Male", 1), ("Female", 2)];

const EDUCATION: &[(&str, i32)] = &[
    ("Graduate School", 1),
    ("University", 2),
    ("High School", 3),
    ("Other", 4),
];

const MARITAL_STATUS: &[(&str, i32)] = &[("Married", 1), ("Single", 2), ("Other", 3)];

// Negative codes are the non-late states; positive codes count months overdue.
const PAYMENT_STATUS: &[(&str, i32)] = &[
    ("Paid on time", 0),
    ("Paid in full", -1),
    ("No consumption", -2),
    ("1 month late", 1),
    ("2 months late", 2),
    ("3 months late", 3),
    ("4+ months late", 4),
];

/// Read-only label/code tables for every category
#[derive(Debug, Clone, Copy)]
pub struct EncodingTables {
    gender: &'static [(&'static str, i32)],
    education: &'static [(&'static str, i32)],
    marital_status: &'static [(&'static str, i32)],
    payment_status: &'static [(&'static str, i32)],
}

impl Default for EncodingTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl EncodingTables {
    /// Tables used by the credit card default dataset
    pub const fn standard() -> Self {
        Self {
            gender: GENDER,
            education: EDUCATION,
            marital_status: MARITAL_STATUS,
            payment_status: PAYMENT_STATUS,
        }
    }

    fn table(&self, category: Category) -> &'static [(&'static str, i32)] {
        match category {
            Category::Gender => self.gender,
            Category::Education => self.education,
            Category::MaritalStatus => self.marital_status,
            Category::PaymentStatus => self.payment_status,
        }
    }

    /// Map a human-readable label to its integer code
    pub fn encode(&self, category: Category, label: &str) -> Result<i32> {
        self.table(category)
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, code)| *code)
            .ok_or_else(|| RiskCoreError::UnknownLabel {
                category: category.to_string(),
                label: label.to_string(),
            })
    }

    /// Reverse lookup of a code
    pub fn decode(&self, category: Category, code: i32) -> Option<&'static str> {
        self.table(category)
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(name, _)| *name)
    }

    /// Labels in the order a form should offer them
    pub fn labels(&self, category: Category) -> Vec<&'static str> {
        self.table(category).iter().map(|(name, _)| *name).collect()
    }

    /// Full `(label, code)` table for a category
    pub fn entries(&self, category: Category) -> &'static [(&'static str, i32)] {
        self.table(category)
    }
}

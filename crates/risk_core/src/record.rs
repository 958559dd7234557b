//! Raw form record and its encoded counterpart
use crate::encoding::{Category, EncodingTables};
use crate::errors::{Result, RiskCoreError};
use serde::{Deserialize, Serialize};

/// Number of historical months collected by the form
pub const MONTHS: usize = 6;

/// Month names, most recent first
pub const MONTH_NAMES: [&str; MONTHS] = ["September", "August", "July", "June", "May", "April"];

/// Youngest age accepted by the form
pub const MIN_AGE: u32 = 18;
/// Oldest age accepted by the form
pub const MAX_AGE: u32 = 100;

/// Values exactly as submitted by the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputRecord {
    /// Total credit limit granted to the customer
    pub limit_balance: f64,
    pub gender: String,
    pub education: String,
    pub marital_status: String,
    /// Age in years
    pub age: u32,
    /// Payment status label per month, most recent first
    pub payment_status: [String; MONTHS],
    /// Billed balance per month, most recent first
    pub bill_amounts: [f64; MONTHS],
    /// Amount paid per month, most recent first
    pub payment_amounts: [f64; MONTHS],
}

/// Record with every categorical field replaced by its code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedRecord {
    pub limit_balance: f64,
    pub gender: i32,
    pub education: i32,
    pub marital_status: i32,
    pub age: u32,
    pub payment_status: [i32; MONTHS],
    pub bill_amounts: [f64; MONTHS],
    pub payment_amounts: [f64; MONTHS],
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> RiskCoreError {
    RiskCoreError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

impl RawInputRecord {
    /// Enforce the ranges a form would enforce before submission
    pub fn validate(&self) -> Result<()> {
        if !self.limit_balance.is_finite() {
            return Err(invalid("limit_balance", "must be a finite number"));
        }
        if self.limit_balance < 0.0 {
            return Err(invalid(
                "limit_balance",
                format!("must be non-negative, got {}", self.limit_balance),
            ));
        }

        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(invalid(
                "age",
                format!("must be within {MIN_AGE}..={MAX_AGE}, got {}", self.age),
            ));
        }

        for (month, value) in MONTH_NAMES.iter().zip(self.bill_amounts.iter()) {
            if !value.is_finite() {
                return Err(invalid(
                    format!("bill_amounts[{month}]"),
                    "must be a finite number",
                ));
            }
        }

        for (month, value) in MONTH_NAMES.iter().zip(self.payment_amounts.iter()) {
            if !value.is_finite() {
                return Err(invalid(
                    format!("payment_amounts[{month}]"),
                    "must be a finite number",
                ));
            }
        }

        Ok(())
    }

    /// Replace labels with codes from `tables`
    pub fn encode(&self, tables: &EncodingTables) -> Result<EncodedRecord> {
        let mut payment_status = [0i32; MONTHS];
        for (slot, label) in payment_status.iter_mut().zip(self.payment_status.iter()) {
            *slot = tables.encode(Category::PaymentStatus, label)?;
        }

        Ok(EncodedRecord {
            limit_balance: self.limit_balance,
            gender: tables.encode(Category::Gender, &self.gender)?,
            education: tables.encode(Category::Education, &self.education)?,
            marital_status: tables.encode(Category::MaritalStatus, &self.marital_status)?,
            age: self.age,
            payment_status,
            bill_amounts: self.bill_amounts,
            payment_amounts: self.payment_amounts,
        })
    }
}

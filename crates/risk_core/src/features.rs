//! Engineered features derived from six months of billing history
//!
//! Plain float arithmetic: sums, one guarded division and a late flag.
//! Nothing is rounded before the ratio is taken.
use crate::errors::{Result, RiskCoreError};
use crate::record::{EncodedRecord, MONTHS};
use serde::{Deserialize, Serialize};

/// Values computed once per prediction request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineeredFeatures {
    /// Sum of the six bill amounts
    pub total_bill: f64,
    /// Sum of the six payment amounts
    pub total_paid: f64,
    /// `total_paid / (total_bill + 1)`
    pub payment_ratio: f64,
    /// 1 if any month was paid late, else 0
    pub has_missed_payment: u8,
}

/// Sum of the monthly bill amounts
pub fn total_bill(bills: &[f64; MONTHS]) -> f64 {
    bills.iter().sum()
}

/// Sum of the monthly payment amounts
pub fn total_paid(payments: &[f64; MONTHS]) -> f64 {
    payments.iter().sum()
}

/// Share of the billed amount that was paid
///
/// The `+ 1` in the denominator keeps the ratio defined when nothing was billed.
pub fn payment_ratio(total_paid: f64, total_bill: f64) -> f64 {
    total_paid / (total_bill + 1.0)
}

/// 1 if any encoded payment status is strictly positive (months late)
pub fn has_missed_payment(status_codes: &[i32; MONTHS]) -> u8 {
    u8::from(status_codes.iter().any(|&code| code > 0))
}

/// Derive every engineered feature from an encoded record
///
/// Bills may be negative (credit balances), so the denominator can still hit
/// zero; a non-finite ratio fails the request.
pub fn engineer(record: &EncodedRecord) -> Result<EngineeredFeatures> {
    let total_bill = total_bill(&record.bill_amounts);
    let total_paid = total_paid(&record.payment_amounts);

    let ratio = payment_ratio(total_paid, total_bill);
    if !ratio.is_finite() {
        return Err(RiskCoreError::InvalidInput {
            field: "payment_ratio".to_string(),
            reason: format!("total bill {total_bill} leaves a zero denominator"),
        });
    }

    Ok(EngineeredFeatures {
        total_bill,
        total_paid,
        payment_ratio: ratio,
        has_missed_payment: has_missed_payment(&record.payment_status),
    })
}

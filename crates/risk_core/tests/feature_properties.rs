use credit_risk_core::encoding::{Category, EncodingTables};
use credit_risk_core::features::{has_missed_payment, payment_ratio, total_bill, total_paid};
use credit_risk_core::record::MONTHS;
use credit_risk_core::{engineer, FeatureLayout, ModelInputRow, RawInputRecord, RiskCoreError};
use proptest::prelude::*;

fn amount() -> impl Strategy<Value = f64> {
    // Whole currency units, as the form collects them
    (-200_000i64..=1_000_000).prop_map(|v| v as f64)
}

fn status_label() -> impl Strategy<Value = String> {
    prop::sample::select(EncodingTables::standard().labels(Category::PaymentStatus))
        .prop_map(String::from)
}

fn raw_record() -> impl Strategy<Value = RawInputRecord> {
    (
        0u32..=1_000_000,
        prop::sample::select(vec!["Male", "Female"]),
        prop::sample::select(EncodingTables::standard().labels(Category::Education)),
        prop::sample::select(EncodingTables::standard().labels(Category::MaritalStatus)),
        18u32..=100,
        prop::array::uniform6(status_label()),
        prop::array::uniform6(amount()),
        prop::array::uniform6(amount()),
    )
        .prop_map(
            |(limit, gender, education, marital, age, status, bills, payments)| RawInputRecord {
                limit_balance: f64::from(limit),
                gender: gender.to_string(),
                education: education.to_string(),
                marital_status: marital.to_string(),
                age,
                payment_status: status,
                bill_amounts: bills,
                payment_amounts: payments,
            },
        )
}

proptest! {
    #[test]
    fn total_bill_is_plain_sum(bills in prop::array::uniform6(amount())) {
        let expected = bills[0] + bills[1] + bills[2] + bills[3] + bills[4] + bills[5];
        prop_assert_eq!(total_bill(&bills), expected);
    }

    #[test]
    fn total_paid_is_plain_sum(payments in prop::array::uniform6(amount())) {
        let expected = payments[0] + payments[1] + payments[2]
            + payments[3] + payments[4] + payments[5];
        prop_assert_eq!(total_paid(&payments), expected);
    }

    #[test]
    fn payment_ratio_uses_guarded_denominator(paid in amount(), billed in -1_200_000i64..=6_000_000) {
        let billed = billed as f64;
        let ratio = payment_ratio(paid, billed);
        prop_assert_eq!(ratio.is_finite(), billed != -1.0);
        if billed != -1.0 {
            prop_assert_eq!(ratio, paid / (billed + 1.0));
        }
    }

    #[test]
    fn engineer_fails_only_on_zero_denominator(
        record in raw_record(),
        first_bill in prop::option::of(-200_000i64..=0),
    ) {
        let mut record = record;
        // Force the bills to sum to -1 on about half the cases
        if let Some(first) = first_bill {
            record.bill_amounts = [first as f64, -1.0 - first as f64, 0.0, 0.0, 0.0, 0.0];
        }
        let encoded = record.encode(&EncodingTables::standard()).unwrap();
        let billed = total_bill(&record.bill_amounts);

        match engineer(&encoded) {
            Ok(features) => {
                prop_assert!(billed != -1.0);
                prop_assert!(features.payment_ratio.is_finite());
            }
            Err(RiskCoreError::InvalidInput { field, .. }) => {
                prop_assert_eq!(billed, -1.0);
                prop_assert_eq!(field, "payment_ratio");
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn missed_flag_iff_any_positive(codes in prop::array::uniform6(-2i32..=4)) {
        let expected = u8::from(codes.iter().any(|&c| c > 0));
        prop_assert_eq!(has_missed_payment(&codes), expected);
    }

    #[test]
    fn rows_follow_layout(record in raw_record()) {
        prop_assert!(record.validate().is_ok());
        let encoded = record.encode(&EncodingTables::standard()).unwrap();
        prop_assume!(total_bill(&record.bill_amounts) != -1.0);
        let features = engineer(&encoded).unwrap();

        for layout in [FeatureLayout::Engineered, FeatureLayout::Base] {
            let row = ModelInputRow::build(layout, &encoded, &features);
            prop_assert_eq!(row.len(), layout.width());
            prop_assert_eq!(row.get("LIMIT_BAL"), Some(record.limit_balance));
            prop_assert_eq!(row.get("AGE"), Some(f64::from(record.age)));
            prop_assert_eq!(row.get("BILL_AMT6"), Some(record.bill_amounts[MONTHS - 1]));
        }

        let row = ModelInputRow::build(FeatureLayout::Engineered, &encoded, &features);
        prop_assert_eq!(row.get("TOTAL_BILL_AMT"), Some(features.total_bill));
        prop_assert_eq!(
            row.get("HAS_MISSED_PAYMENT"),
            Some(f64::from(features.has_missed_payment))
        );
    }
}

#[test]
fn on_time_statuses_never_flag() {
    let tables = EncodingTables::standard();
    let on_time = tables.encode(Category::PaymentStatus, "Paid on time").unwrap();
    assert_eq!(has_missed_payment(&[on_time; MONTHS]), 0);

    let mut codes = [on_time; MONTHS];
    codes[3] = tables.encode(Category::PaymentStatus, "2 months late").unwrap();
    assert_eq!(has_missed_payment(&codes), 1);
}

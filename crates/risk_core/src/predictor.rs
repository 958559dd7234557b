//! Single-request prediction: record in, prediction out
//!
//! The predictor owns only immutable state (classifier, encoding tables,
//! resolved layout), so one instance serves every request.

use crate::classifier::{Classifier, POSITIVE_CLASS};
use crate::config::LayoutSetting;
use crate::encoding::EncodingTables;
use crate::errors::{Result, RiskCoreError};
use crate::features::{engineer, EngineeredFeatures};
use crate::record::{EncodedRecord, RawInputRecord};
use crate::report::{DefaultLabel, PredictionResult};
use crate::schema::{FeatureLayout, ModelInputRow};
use tracing::{debug, info, instrument};

/// Intermediate products of mapping one record
#[derive(Debug, Clone)]
pub struct PreparedRow {
    pub encoded: EncodedRecord,
    pub features: EngineeredFeatures,
    pub row: ModelInputRow,
}

/// Feature mapper and predictor around an injected classifier
#[derive(Debug)]
pub struct Predictor<C> {
    classifier: C,
    tables: EncodingTables,
    layout: FeatureLayout,
}

/// Decide which layout to build rows with
///
/// An explicit setting wins; with `enforce_schema` it must still agree with
/// the classifier's declared names. `Auto` matches the declared names, or
/// falls back to the engineered layout when none are declared.
pub fn resolve_layout(
    setting: LayoutSetting,
    declared: Option<&[String]>,
    enforce_schema: bool,
) -> Result<FeatureLayout> {
    match (setting.fixed(), declared) {
        (Some(layout), Some(names)) if enforce_schema => {
            layout.ensure_matches(names)?;
            Ok(layout)
        }
        (Some(layout), _) => Ok(layout),
        (None, Some(names)) => FeatureLayout::matching(names).ok_or_else(|| {
            RiskCoreError::SchemaMismatch(format!(
                "classifier declares {} columns matching no known layout (first: {:?})",
                names.len(),
                names.first()
            ))
        }),
        (None, None) => Ok(FeatureLayout::Engineered),
    }
}

impl<C: Classifier> Predictor<C> {
    /// Build a predictor, checking the layout against the classifier schema
    pub fn new(classifier: C, setting: LayoutSetting, enforce_schema: bool) -> Result<Self> {
        let layout = resolve_layout(setting, classifier.feature_names(), enforce_schema)?;
        info!(%layout, columns = layout.width(), "Predictor ready");
        Ok(Self {
            classifier,
            tables: EncodingTables::standard(),
            layout,
        })
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Validate, encode and engineer a record into a model input row
    pub fn prepare(&self, record: &RawInputRecord) -> Result<PreparedRow> {
        record.validate()?;
        let encoded = record.encode(&self.tables)?;
        let features = engineer(&encoded)?;
        let row = ModelInputRow::build(self.layout, &encoded, &features);
        debug!(
            total_bill = features.total_bill,
            total_paid = features.total_paid,
            payment_ratio = features.payment_ratio,
            has_missed_payment = features.has_missed_payment,
            "Engineered features"
        );
        Ok(PreparedRow {
            encoded,
            features,
            row,
        })
    }

    /// Run one prediction request
    #[instrument(skip(self, record), fields(layout = %self.layout))]
    pub fn predict(&self, record: &RawInputRecord) -> Result<PredictionResult> {
        let prepared = self.prepare(record)?;
        self.predict_row(&prepared.row)
    }

    /// Classify an already-built row
    pub fn predict_row(&self, row: &ModelInputRow) -> Result<PredictionResult> {
        let class = self.classifier.predict(row)?;
        let label = DefaultLabel::from_class(class).ok_or_else(|| {
            RiskCoreError::Classifier(format!("label {class} is not a binary class"))
        })?;

        let probabilities = self.classifier.predict_proba(row)?;
        if probabilities.len() != 2 {
            return Err(RiskCoreError::Classifier(format!(
                "expected 2 class probabilities, got {}",
                probabilities.len()
            )));
        }
        let probability_default = probabilities[POSITIVE_CLASS];
        if !(0.0..=1.0).contains(&probability_default) {
            return Err(RiskCoreError::Classifier(format!(
                "positive-class probability {probability_default} outside [0, 1]"
            )));
        }

        info!(?label, probability_default, "Prediction complete");
        Ok(PredictionResult {
            label,
            probability_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::sample_record;
    use std::cell::Cell;

    /// Returns a fixed answer and counts calls
    #[derive(Debug)]
    struct StubClassifier {
        label: u8,
        proba: Vec<f64>,
        names: Option<Vec<String>>,
        calls: Cell<usize>,
    }

    impl StubClassifier {
        fn new(label: u8, positive: f64) -> Self {
            Self {
                label,
                proba: vec![1.0 - positive, positive],
                names: None,
                calls: Cell::new(0),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn predict(&self, _row: &ModelInputRow) -> Result<u8> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.label)
        }

        fn predict_proba(&self, _row: &ModelInputRow) -> Result<Vec<f64>> {
            Ok(self.proba.clone())
        }

        fn feature_names(&self) -> Option<&[String]> {
            self.names.as_deref()
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn predict(&self, _row: &ModelInputRow) -> Result<u8> {
            Err(RiskCoreError::Classifier("model file truncated".into()))
        }

        fn predict_proba(&self, _row: &ModelInputRow) -> Result<Vec<f64>> {
            unreachable!("predict fails first")
        }
    }

    fn names(layout: FeatureLayout) -> Vec<String> {
        layout.columns().into_iter().map(String::from).collect()
    }

    #[test]
    fn test_predict_default_with_stub() {
        let predictor =
            Predictor::new(StubClassifier::new(1, 0.83), LayoutSetting::Auto, true).unwrap();
        let result = predictor.predict(&sample_record()).unwrap();

        assert_eq!(result.label, DefaultLabel::Default);
        assert_eq!(result.probability_default, 0.83);
        assert_eq!(result.assessment().displayed_probability(), "0.83");
    }

    #[test]
    fn test_predict_no_default_with_stub() {
        let predictor =
            Predictor::new(StubClassifier::new(0, 0.20), LayoutSetting::Auto, true).unwrap();
        let result = predictor.predict(&sample_record()).unwrap();

        assert_eq!(result.label, DefaultLabel::NoDefault);
        assert_eq!(result.assessment().displayed_probability(), "0.80");
    }

    #[test]
    fn test_auto_layout_without_declared_names_is_engineered() {
        let predictor =
            Predictor::new(StubClassifier::new(0, 0.1), LayoutSetting::Auto, true).unwrap();
        assert_eq!(predictor.layout(), FeatureLayout::Engineered);
    }

    #[test]
    fn test_auto_layout_follows_declared_names() {
        let mut stub = StubClassifier::new(0, 0.1);
        stub.names = Some(names(FeatureLayout::Base));
        let predictor = Predictor::new(stub, LayoutSetting::Auto, true).unwrap();
        assert_eq!(predictor.layout(), FeatureLayout::Base);

        let prepared = predictor.prepare(&sample_record()).unwrap();
        assert_eq!(prepared.row.len(), 23);
    }

    #[test]
    fn test_forced_layout_conflicting_with_schema() {
        let mut stub = StubClassifier::new(0, 0.1);
        stub.names = Some(names(FeatureLayout::Base));
        let err = Predictor::new(stub, LayoutSetting::Engineered, true).unwrap_err();
        assert!(matches!(err, RiskCoreError::SchemaMismatch(_)));
    }

    #[test]
    fn test_forced_layout_without_enforcement() {
        let mut stub = StubClassifier::new(0, 0.1);
        stub.names = Some(names(FeatureLayout::Base));
        let predictor = Predictor::new(stub, LayoutSetting::Engineered, false).unwrap();
        assert_eq!(predictor.layout(), FeatureLayout::Engineered);
    }

    #[test]
    fn test_unknown_declared_schema_rejected() {
        let mut stub = StubClassifier::new(0, 0.1);
        stub.names = Some(vec!["f0".into(), "f1".into()]);
        let err = Predictor::new(stub, LayoutSetting::Auto, true).unwrap_err();
        assert!(matches!(err, RiskCoreError::SchemaMismatch(_)));
    }

    #[test]
    fn test_invalid_record_never_reaches_classifier() {
        let predictor =
            Predictor::new(StubClassifier::new(1, 0.9), LayoutSetting::Auto, true).unwrap();
        let mut record = sample_record();
        record.education = "Doctorate".into();

        let err = predictor.predict(&record).unwrap_err();
        assert!(matches!(err, RiskCoreError::UnknownLabel { .. }));
        assert_eq!(predictor.classifier().calls.get(), 0);
    }

    #[test]
    fn test_classifier_error_passes_through() {
        let predictor = Predictor::new(FailingClassifier, LayoutSetting::Auto, true).unwrap();
        let err = predictor.predict(&sample_record()).unwrap_err();
        assert_eq!(err.to_string(), "Classifier failure: model file truncated");
    }

    #[test]
    fn test_non_binary_label_rejected() {
        let predictor =
            Predictor::new(StubClassifier::new(3, 0.5), LayoutSetting::Auto, true).unwrap();
        assert!(matches!(
            predictor.predict(&sample_record()),
            Err(RiskCoreError::Classifier(_))
        ));
    }

    #[test]
    fn test_bad_probability_vector_rejected() {
        let mut stub = StubClassifier::new(1, 0.5);
        stub.proba = vec![0.5];
        let predictor = Predictor::new(stub, LayoutSetting::Auto, true).unwrap();
        assert!(predictor.predict(&sample_record()).is_err());

        let mut stub = StubClassifier::new(1, 0.5);
        stub.proba = vec![-0.2, 1.2];
        let predictor = Predictor::new(stub, LayoutSetting::Auto, true).unwrap();
        assert!(predictor.predict(&sample_record()).is_err());

        let mut stub = StubClassifier::new(1, 0.5);
        stub.proba = vec![f64::NAN, f64::NAN];
        let predictor = Predictor::new(stub, LayoutSetting::Auto, true).unwrap();
        assert!(predictor.predict(&sample_record()).is_err());
    }
}

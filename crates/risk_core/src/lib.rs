//! Credit Card Default Risk Core
//!
//! Maps a customer data-entry record to the feature row a pre-trained
//! classifier expects, runs the classifier, and reports the default risk.
//!
//! Modules:
//! - `encoding`: Closed label → code tables for categorical inputs
//! - `record`: Raw form record and boundary validation
//! - `features`: Engineered billing/payment features
//! - `schema`: Model input row layouts and schema checks
//! - `classifier`: Classifier capability boundary
//! - `ensemble`: Embedded fixed-point tree-ensemble classifier
//! - `predictor`: Single-request prediction pipeline
//! - `report`: Prediction result and rendered assessment
//! - `config`: TOML/env configuration

pub mod classifier;
pub mod config;
pub mod encoding;
pub mod ensemble;
pub mod errors;
pub mod features;
pub mod predictor;
pub mod record;
pub mod report;
pub mod schema;
pub mod serde_canon;

pub use classifier::Classifier;
pub use config::{LayoutSetting, LogFormat, RiskConfig};
pub use encoding::{Category, EncodingTables};
pub use ensemble::{load_model, EnsembleModel, Objective};
pub use errors::{Result, RiskCoreError};
pub use features::{engineer, EngineeredFeatures};
pub use predictor::{resolve_layout, PreparedRow, Predictor};
pub use record::{EncodedRecord, RawInputRecord, MONTHS, MONTH_NAMES};
pub use report::{DefaultLabel, PredictionResult, RiskAssessment, RiskLevel};
pub use schema::{FeatureLayout, ModelInputRow};

/// Crate version string for reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load the configured artifact and build a ready predictor
///
/// This is the startup path: the artifact is read once, its hash checked if
/// pinned, and its schema reconciled with the configured layout.
pub fn predictor_from_config(config: &RiskConfig) -> Result<Predictor<EnsembleModel>> {
    config.ensure_valid()?;
    let model = load_model(&config.model.path, config.model.expected_hash.as_deref())?;
    Predictor::new(model, config.features.layout, config.model.enforce_schema)
}

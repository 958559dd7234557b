//! Prediction result and the assessment shown to the operator
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary outcome predicted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultLabel {
    NoDefault,
    Default,
}

impl DefaultLabel {
    /// Label from a classifier class index
    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            0 => Some(DefaultLabel::NoDefault),
            1 => Some(DefaultLabel::Default),
            _ => None,
        }
    }

    pub fn class(self) -> u8 {
        match self {
            DefaultLabel::NoDefault => 0,
            DefaultLabel::Default => 1,
        }
    }
}

/// Classifier output for one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: DefaultLabel,
    /// Probability of the positive class (default), in [0, 1]
    pub probability_default: f64,
}

impl PredictionResult {
    pub fn assessment(&self) -> RiskAssessment {
        RiskAssessment::from_prediction(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Low,
}

/// Rendered outcome: headline plus the probability of the predicted outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub headline: String,
    pub probability_label: String,
    /// Probability of the predicted outcome (default for high risk, non-default for low)
    pub probability: f64,
}

impl RiskAssessment {
    pub fn from_prediction(result: &PredictionResult) -> Self {
        match result.label {
            DefaultLabel::Default => Self {
                level: RiskLevel::High,
                headline: "High Risk of Default".to_string(),
                probability_label: "Probability of Default".to_string(),
                probability: result.probability_default,
            },
            DefaultLabel::NoDefault => Self {
                level: RiskLevel::Low,
                headline: "Low Risk of Default".to_string(),
                probability_label: "Probability of Non-Default".to_string(),
                probability: 1.0 - result.probability_default,
            },
        }
    }

    /// Probability rounded to two decimals for display
    pub fn displayed_probability(&self) -> String {
        format!("{:.2}", self.probability)
    }
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n\n{}: {}",
            self.headline,
            self.probability_label,
            self.displayed_probability()
        )
    }
}

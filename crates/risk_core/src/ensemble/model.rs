//! Tree-ensemble classifier artifact
//!
//! Scoring is integer-only: row values are quantized to fixed-point at
//! `scale`, each tree contributes `leaf * weight / scale`, and the sum plus
//! `bias` is a score at `post_scale`. Only the final probability is a float.

use super::tree::{Traversal, Tree};
use crate::classifier::Classifier;
use crate::errors::{Result, RiskCoreError};
use crate::schema::ModelInputRow;
use crate::serde_canon::{canonical_hash_hex, to_canonical_json};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default fixed-point scale (1e6)
pub const SCALE: i64 = 1_000_000;

/// Artifact format version understood by this crate
pub const FORMAT_VERSION: i32 = 1;

/// How the ensemble score becomes a probability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Score is already a probability at `post_scale` (averaged forest)
    #[default]
    Probability,
    /// Score is a log-odds margin at `post_scale` (boosted trees)
    Logistic,
}

/// Pre-trained tree ensemble
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnsembleModel {
    /// Artifact format version
    pub version: i32,

    /// Fixed-point scale for thresholds, leaves and tree weights
    pub scale: i64,

    /// Fixed-point scale of the aggregated score
    pub post_scale: i64,

    /// Bias added to the score (at `post_scale`)
    pub bias: i64,

    #[serde(default)]
    pub objective: Objective,

    /// Positive-class cut-off at `post_scale`; label 1 iff probability exceeds it
    #[serde(default)]
    pub threshold: Option<i64>,

    /// Training schema, in column order
    #[serde(default)]
    pub feature_names: Vec<String>,

    pub trees: Vec<Tree>,
}

impl EnsembleModel {
    /// Probability-objective ensemble at the default scale
    pub fn new(trees: Vec<Tree>, bias: i64, feature_names: Vec<String>) -> Self {
        Self {
            version: FORMAT_VERSION,
            scale: SCALE,
            post_scale: SCALE,
            bias,
            objective: Objective::Probability,
            threshold: None,
            feature_names,
            trees,
        }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Effective decision threshold at `post_scale`
    pub fn decision_threshold(&self) -> i64 {
        self.threshold.unwrap_or(self.post_scale / 2)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Validate artifact structure
    pub fn validate(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(RiskCoreError::ArtifactLoad(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }
        if self.scale <= 0 {
            return Err(RiskCoreError::ArtifactLoad(format!(
                "Invalid scale: {}",
                self.scale
            )));
        }
        if self.post_scale <= 0 {
            return Err(RiskCoreError::ArtifactLoad(format!(
                "Invalid post_scale: {}",
                self.post_scale
            )));
        }
        if self.trees.is_empty() {
            return Err(RiskCoreError::ArtifactLoad("Model has no trees".into()));
        }

        let threshold = self.decision_threshold();
        if !(0..=self.post_scale).contains(&threshold) {
            return Err(RiskCoreError::ArtifactLoad(format!(
                "Threshold {threshold} outside [0, {}]",
                self.post_scale
            )));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| {
                RiskCoreError::ArtifactLoad(format!("Tree {i} validation failed: {e}"))
            })?;

            if self.feature_names.is_empty() {
                continue;
            }
            if let Some(max_idx) = tree.max_feature_index() {
                if max_idx >= self.feature_names.len() {
                    return Err(RiskCoreError::ArtifactLoad(format!(
                        "Tree {i} splits on column {max_idx} but only {} features are declared",
                        self.feature_names.len()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Convert row values to fixed-point at the model scale
    ///
    /// Values that are not finite or do not fit an `i64` once scaled are
    /// rejected rather than saturated.
    pub fn quantize(&self, values: &[f64]) -> Result<Vec<i64>> {
        let scale = self.scale as f64;
        values
            .iter()
            .enumerate()
            .map(|(idx, v)| {
                let scaled = (v * scale).round();
                // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
                if scaled.is_finite() && scaled >= i64::MIN as f64 && scaled < i64::MAX as f64 {
                    Ok(scaled as i64)
                } else {
                    Err(RiskCoreError::Classifier(format!(
                        "Column {idx} value {v} does not fit fixed-point scale {}",
                        self.scale
                    )))
                }
            })
            .collect()
    }

    /// Aggregated score at `post_scale` for already-quantized features
    pub fn score(&self, features: &[i64]) -> Result<i64> {
        let mut sum = self.bias;

        for (i, tree) in self.trees.iter().enumerate() {
            let leaf = match tree.traverse(features) {
                Traversal::Leaf(value) => value,
                Traversal::MissingFeature(idx) => {
                    return Err(RiskCoreError::Classifier(format!(
                        "Tree {i} needs column {idx}, row has {} columns",
                        features.len()
                    )));
                }
                Traversal::Malformed(node) => {
                    return Err(RiskCoreError::Classifier(format!(
                        "Tree {i} is malformed at node {node}"
                    )));
                }
            };

            let contribution = (i128::from(leaf) * i128::from(tree.weight)) / i128::from(self.scale);
            let contribution = i64::try_from(contribution).unwrap_or(if contribution < 0 {
                i64::MIN
            } else {
                i64::MAX
            });
            sum = sum.saturating_add(contribution);
        }

        Ok(sum)
    }

    /// Positive-class probability for a score
    pub fn probability(&self, score: i64) -> f64 {
        let post_scale = self.post_scale as f64;
        match self.objective {
            Objective::Probability => score.clamp(0, self.post_scale) as f64 / post_scale,
            Objective::Logistic => {
                let margin = score as f64 / post_scale;
                1.0 / (1.0 + (-margin).exp())
            }
        }
    }

    fn check_row(&self, row: &ModelInputRow) -> Result<()> {
        if !self.feature_names.is_empty() && row.len() != self.feature_names.len() {
            return Err(RiskCoreError::Classifier(format!(
                "Row has {} columns, model expects {}",
                row.len(),
                self.feature_names.len()
            )));
        }
        Ok(())
    }

    fn positive_probability(&self, row: &ModelInputRow) -> Result<f64> {
        self.check_row(row)?;
        let features = self.quantize(row.values())?;
        let score = self.score(&features)?;
        let probability = self.probability(score);
        debug!(score, probability, "Ensemble scored row");
        Ok(probability)
    }

    /// Serialize to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String> {
        to_canonical_json(self)
    }

    /// blake3 hash of the canonical JSON form, hex-encoded
    pub fn hash_hex(&self) -> Result<String> {
        canonical_hash_hex(self)
    }

    /// Write the canonical JSON form to `path`
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Parse and validate an artifact from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let model: EnsembleModel = serde_json::from_str(json)
            .map_err(|e| RiskCoreError::ArtifactLoad(format!("Invalid model JSON: {e}")))?;
        model.validate()?;
        Ok(model)
    }
}

impl Classifier for EnsembleModel {
    fn predict(&self, row: &ModelInputRow) -> Result<u8> {
        let probability = self.positive_probability(row)?;
        let cutoff = self.decision_threshold() as f64 / self.post_scale as f64;
        Ok(u8::from(probability > cutoff))
    }

    fn predict_proba(&self, row: &ModelInputRow) -> Result<Vec<f64>> {
        let probability = self.positive_probability(row)?;
        Ok(vec![1.0 - probability, probability])
    }

    fn feature_names(&self) -> Option<&[String]> {
        if self.feature_names.is_empty() {
            None
        } else {
            Some(&self.feature_names)
        }
    }
}

/// Load a model artifact, optionally pinning its canonical hash
#[instrument(skip(path), fields(artifact = %path.as_ref().display()))]
pub fn load_model<P: AsRef<Path>>(path: P, expected_hash: Option<&str>) -> Result<EnsembleModel> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| {
        RiskCoreError::ArtifactLoad(format!("Cannot read {}: {e}", path.display()))
    })?;
    let model = EnsembleModel::from_json(&json)?;
    let actual = model.hash_hex()?;

    if let Some(expected) = expected_hash {
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(RiskCoreError::HashMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
    }

    info!(
        trees = model.num_trees(),
        features = model.feature_names.len(),
        objective = ?model.objective,
        hash = %actual,
        "Loaded model artifact"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::tree::Node;

    fn two_tree_model() -> EnsembleModel {
        // Averaged forest over columns 0 and 1: each tree votes half.
        let tree1 = Tree::new(
            vec![
                Node::internal(0, 0, 50 * SCALE, 1, 2),
                Node::leaf(1, 200_000),
                Node::leaf(2, 900_000),
            ],
            SCALE / 2,
        );
        let tree2 = Tree::new(
            vec![
                Node::internal(0, 1, 30 * SCALE, 1, 2),
                Node::leaf(1, 100_000),
                Node::leaf(2, 700_000),
            ],
            SCALE / 2,
        );
        EnsembleModel::new(vec![tree1, tree2], 0, vec!["A".into(), "B".into()])
    }

    #[test]
    fn test_score_averages_trees() {
        let model = two_tree_model();
        // (200k + 100k) / 2
        assert_eq!(model.score(&[30 * SCALE, 20 * SCALE]).unwrap(), 150_000);
        // (900k + 700k) / 2
        assert_eq!(model.score(&[60 * SCALE, 40 * SCALE]).unwrap(), 800_000);
    }

    #[test]
    fn test_quantize_rounds_to_scale() {
        let model = two_tree_model();
        assert_eq!(
            model.quantize(&[1.5, -0.25, 0.0000004]).unwrap(),
            vec![1_500_000, -250_000, 0]
        );
    }

    #[test]
    fn test_quantize_rejects_out_of_range_values() {
        let model = two_tree_model();
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e13, -1e13] {
            let err = model.quantize(&[1.0, value]).unwrap_err();
            assert!(matches!(err, RiskCoreError::Classifier(ref msg) if msg.contains("Column 1")));
        }
        // Just under the i64 limit at 1e6
        assert!(model.quantize(&[9.2e12]).is_ok());
    }

    #[test]
    fn test_score_missing_column_is_error() {
        let model = two_tree_model();
        let err = model.score(&[60 * SCALE]).unwrap_err();
        assert!(matches!(err, RiskCoreError::Classifier(_)));
    }

    #[test]
    fn test_probability_objective_clamps() {
        let model = two_tree_model();
        assert_eq!(model.probability(-5), 0.0);
        assert_eq!(model.probability(250_000), 0.25);
        assert_eq!(model.probability(2 * SCALE), 1.0);
    }

    #[test]
    fn test_logistic_objective() {
        let model = two_tree_model().with_objective(Objective::Logistic);
        assert_eq!(model.probability(0), 0.5);
        assert!(model.probability(3 * SCALE) > 0.95);
        assert!(model.probability(-3 * SCALE) < 0.05);
    }

    #[test]
    fn test_decision_threshold_default_and_override() {
        let model = two_tree_model();
        assert_eq!(model.decision_threshold(), SCALE / 2);
        assert_eq!(model.with_threshold(300_000).decision_threshold(), 300_000);
    }

    #[test]
    fn test_validation() {
        assert!(two_tree_model().validate().is_ok());

        let mut bad = two_tree_model();
        bad.version = 7;
        assert!(bad.validate().is_err());

        let mut bad = two_tree_model();
        bad.scale = 0;
        assert!(bad.validate().is_err());

        let mut bad = two_tree_model();
        bad.trees.clear();
        assert!(bad.validate().is_err());

        let bad = two_tree_model().with_threshold(SCALE + 1);
        assert!(bad.validate().is_err());

        let mut bad = two_tree_model();
        bad.feature_names.pop();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        let model = two_tree_model();
        let hash = model.hash_hex().unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, two_tree_model().hash_hex().unwrap());

        let shifted = two_tree_model().with_threshold(400_000);
        assert_ne!(hash, shifted.hash_hex().unwrap());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let model = two_tree_model();
        let file = tempfile::NamedTempFile::new().unwrap();
        model.save_json(file.path()).unwrap();

        let hash = model.hash_hex().unwrap();
        let loaded = load_model(file.path(), Some(&hash)).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_load_rejects_hash_mismatch() {
        let model = two_tree_model();
        let file = tempfile::NamedTempFile::new().unwrap();
        model.save_json(file.path()).unwrap();

        let err = load_model(file.path(), Some(&"0".repeat(64))).unwrap_err();
        assert!(matches!(err, RiskCoreError::HashMismatch { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_model("/nonexistent/model.json", None).unwrap_err();
        assert!(matches!(err, RiskCoreError::ArtifactLoad(_)));
    }
}

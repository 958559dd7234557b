//! Classifier capability boundary
//!
//! The predictor only needs a label and a class-probability vector for one
//! row. Any scoring engine can sit behind this trait; the embedded tree
//! ensemble in [`crate::ensemble`] is one implementation.
use crate::errors::Result;
use crate::schema::ModelInputRow;

/// Positive class index in probability vectors
pub const POSITIVE_CLASS: usize = 1;

/// Pre-fitted binary classifier
pub trait Classifier {
    /// Predicted label, 0 (no default) or 1 (default)
    fn predict(&self, row: &ModelInputRow) -> Result<u8>;

    /// Probability per class, indexed by label
    fn predict_proba(&self, row: &ModelInputRow) -> Result<Vec<f64>>;

    /// Column names the classifier was trained on, if it records them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn predict(&self, row: &ModelInputRow) -> Result<u8> {
        (**self).predict(row)
    }

    fn predict_proba(&self, row: &ModelInputRow) -> Result<Vec<f64>> {
        (**self).predict_proba(row)
    }

    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict(&self, row: &ModelInputRow) -> Result<u8> {
        (**self).predict(row)
    }

    fn predict_proba(&self, row: &ModelInputRow) -> Result<Vec<f64>> {
        (**self).predict_proba(row)
    }

    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }
}

//! Gradient boosted tree ensemble predicting monthly rent

use super::tree::Tree;
use crate::features::schema_names;
use crate::serde_canon::{fingerprint_hex, to_canonical_json, CanonicalError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("Expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("Tree {0} did not reach a leaf")]
    Evaluation(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}

/// Default fixed-point scale (three decimals)
pub const SCALE: i64 = 1_000;

/// Rent regression ensemble
///
/// Thresholds, leaf values, tree weights and the bias are fixed-point
/// integers at `scale`. Raw features are lifted to `scale` before the
/// trees are walked, so the same artifact gives the same answer on every
/// platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GbdtModel {
    pub version: i32,
    pub scale: i64,
    /// Input slot names, in the order the trees index them
    pub feature_names: Vec<String>,
    pub trees: Vec<Tree>,
    pub bias: i64,
}

impl GbdtModel {
    /// Create a model over the standard listing schema
    pub fn new(trees: Vec<Tree>, bias: i64) -> Self {
        Self {
            version: 1,
            scale: SCALE,
            feature_names: schema_names().into_iter().map(String::from).collect(),
            trees,
            bias,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != 1 {
            return Err(ModelError::ValidationFailed(format!(
                "unsupported model version {}",
                self.version
            )));
        }

        if self.scale <= 0 {
            return Err(ModelError::ValidationFailed(format!(
                "invalid scale {}",
                self.scale
            )));
        }

        let expected = schema_names();
        if self.feature_names != expected {
            return Err(ModelError::ValidationFailed(format!(
                "feature order {:?} does not match {:?}",
                self.feature_names, expected
            )));
        }

        if self.trees.is_empty() {
            return Err(ModelError::ValidationFailed(
                "model has no trees".to_string(),
            ));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count())
                .map_err(|e| ModelError::ValidationFailed(format!("tree {i}: {e}")))?;
        }

        Ok(())
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Fixed-point score for raw (unscaled) features
    ///
    /// Each tree contributes `leaf * weight / scale`; the bias is added once.
    pub fn score(&self, features: &[i64]) -> Result<i64, ModelError> {
        if features.len() != self.feature_count() {
            return Err(ModelError::FeatureCount {
                expected: self.feature_count(),
                actual: features.len(),
            });
        }

        let scaled: Vec<i64> = features
            .iter()
            .map(|value| value.saturating_mul(self.scale))
            .collect();

        let scale = i128::from(self.scale);
        let mut sum = i128::from(self.bias);
        for (i, tree) in self.trees.iter().enumerate() {
            let leaf = tree.evaluate(&scaled).ok_or(ModelError::Evaluation(i))?;
            sum += i128::from(leaf) * i128::from(tree.weight) / scale;
        }

        Ok(sum.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }

    /// Score converted back to currency units
    pub fn predict_value(&self, features: &[i64]) -> Result<f64, ModelError> {
        Ok(self.score(features)? as f64 / self.scale as f64)
    }

    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        Ok(to_canonical_json(self)?)
    }

    /// Blake3 fingerprint of the canonical artifact
    pub fn hash_hex(&self) -> Result<String, ModelError> {
        Ok(fingerprint_hex(self)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Load and validate a model artifact
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        let model: GbdtModel = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

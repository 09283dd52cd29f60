//! The seam between the prediction pipeline and the rent model

use crate::errors::{Artifact, RentError, Result};
use crate::features::FeatureVector;
use crate::gbdt::{GbdtModel, ModelError};
use std::path::Path;
use tracing::{debug, info};

/// A pre-trained rent regressor with a fixed positional input contract
pub trait RentModel: Send + Sync {
    /// Number of features `predict` expects
    fn feature_count(&self) -> usize;

    /// Predicted monthly rent for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Stable identifier of the loaded artifact
    fn fingerprint(&self) -> String;
}

impl RentModel for GbdtModel {
    fn feature_count(&self) -> usize {
        GbdtModel::feature_count(self)
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let rent = self
            .predict_value(features.as_slice())
            .map_err(|err| match err {
                ModelError::FeatureCount { expected, actual } => {
                    RentError::MalformedFeatureVector { expected, actual }
                }
                _ => RentError::MalformedFeatureVector {
                    expected: GbdtModel::feature_count(self),
                    actual: features.len(),
                },
            })?;
        debug!("Model scored {:?} -> {}", features.as_slice(), rent);
        Ok(rent)
    }

    fn fingerprint(&self) -> String {
        self.hash_hex().unwrap_or_else(|_| String::from("unknown"))
    }
}

/// Load the model artifact; any failure is a startup error
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<GbdtModel> {
    let path = path.as_ref();
    let model = GbdtModel::load_json(path).map_err(|e| {
        RentError::startup_load(Artifact::Model, format!("{}: {e}", path.display()))
    })?;

    info!(
        "Loaded rent model from {} ({} trees, fingerprint {})",
        path.display(),
        model.num_trees(),
        RentModel::fingerprint(&model)
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbdt::model::tests::create_test_model;

    #[test]
    fn test_predict_through_trait() {
        let model: Box<dyn RentModel> = Box::new(create_test_model());
        let features = FeatureVector::from_raw(vec![1200, 3, 2, 10, 2, 0, 0, 1, 2]);
        assert_eq!(model.predict(&features).unwrap(), 26_500.25);
        assert_eq!(model.feature_count(), 9);
    }

    #[test]
    fn test_short_vector_is_malformed() {
        let model = create_test_model();
        let features = FeatureVector::from_raw(vec![1000, 2, 2, 1]);
        let err = RentModel::predict(&model, &features).unwrap_err();
        assert!(matches!(
            err,
            RentError::MalformedFeatureVector {
                expected: 9,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_load_model_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(dir.path().join("model.json")).unwrap_err();
        assert!(matches!(
            err,
            RentError::StartupLoad {
                artifact: Artifact::Model,
                ..
            }
        ));
    }

    #[test]
    fn test_load_model_corrupt_artifact() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{\"version\": 1, \"trees\": [").unwrap();
        assert!(matches!(
            load_model(file.path()),
            Err(RentError::StartupLoad { .. })
        ));
    }

    #[test]
    fn test_fingerprint_matches_hash() {
        let model = create_test_model();
        assert_eq!(RentModel::fingerprint(&model), model.hash_hex().unwrap());
    }
}

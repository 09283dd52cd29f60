//! Encode → predict → record
//!
//! One call to [`PredictionPipeline::predict`] validates a listing, encodes
//! its categorical values, lays the vector out in schema order, scores it,
//! rounds the rent to two decimals and appends the result to the caller's
//! history. Any failure aborts the request before the history is touched.

use crate::encoders::{CategoricalField, EncoderRegistry};
use crate::errors::{Artifact, RentError, Result};
use crate::features::{FeatureVector, ListingInput, FEATURE_SCHEMA};
use crate::history::{HistoryStore, PredictionRecord};
use crate::model::{load_model, RentModel};
use rust_decimal::{Decimal, RoundingStrategy};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Shown when a session asks for history before predicting anything
pub const EMPTY_HISTORY_MESSAGE: &str = "No predictions made yet.";

/// Round to two decimals, ties to even.
///
/// Works on the exact binary value of `value`, so 2.675 (stored just below
/// the tie) rounds down while 0.125 (an exact tie) goes to the even cent.
pub fn round_rent(value: f64) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    let mut cents = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    cents.rescale(2);
    cents.mantissa() as f64 / 100.0
}

/// Success message for a rounded rent
pub fn estimate_message(rent: f64, currency_symbol: &str) -> String {
    format!("Estimated Monthly Rent: {currency_symbol}{rent:.2}")
}

/// Read-only encoders and model, shareable across sessions
#[derive(Clone)]
pub struct PredictionPipeline {
    registry: Arc<EncoderRegistry>,
    model: Arc<dyn RentModel>,
}

impl PredictionPipeline {
    pub fn new<M: RentModel + 'static>(registry: EncoderRegistry, model: M) -> Result<Self> {
        if model.feature_count() != FEATURE_SCHEMA.len() {
            return Err(RentError::startup_load(
                Artifact::Model,
                format!(
                    "model expects {} features, listing schema has {}",
                    model.feature_count(),
                    FEATURE_SCHEMA.len()
                ),
            ));
        }

        Ok(Self {
            registry: Arc::new(registry),
            model: Arc::new(model),
        })
    }

    /// Load both artifacts. Either failing is fatal to startup.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(model_path: P, encoders_path: Q) -> Result<Self> {
        let registry = EncoderRegistry::load_json(encoders_path)?;
        let model = load_model(model_path)?;
        Self::new(registry, model)
    }

    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }

    pub fn model(&self) -> &dyn RentModel {
        self.model.as_ref()
    }

    pub fn vocabulary_for(&self, field: CategoricalField) -> &[String] {
        self.registry.vocabulary_for(field)
    }

    /// Rounded rent for `listing` without recording it
    pub fn estimate(&self, listing: &ListingInput) -> Result<f64> {
        listing.validate()?;
        let features = FeatureVector::assemble(listing, &self.registry)?;
        debug!("Encoded listing as {:?}", features.as_slice());

        let raw = self.model.predict(&features)?;
        Ok(round_rent(raw))
    }

    /// Predict, record the result in `history`, and return the rounded rent
    pub fn predict(&self, listing: ListingInput, history: &mut HistoryStore) -> Result<f64> {
        let rent = self.estimate(&listing)?;

        history.append(PredictionRecord::new(listing, rent));
        Ok(rent)
    }
}
